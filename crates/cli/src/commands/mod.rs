pub(crate) mod accounts;
pub(crate) mod serve;
pub(crate) mod session;
