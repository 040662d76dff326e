use venti_core::{
    Entry, NewStory, RecordId, Story, StoryChanges, TempId, discard, position_of, reconcile,
};
use venti_storage::StoryStore;

use super::Mutations;
use crate::deadline::within;
use crate::error::ServiceError;

const MISSING_FIELDS: &str = "Please provide a title and content for your story.";

fn validated(title: &str, content: &str) -> Option<StoryChanges> {
    let (title, content) = (title.trim(), content.trim());
    (!title.is_empty() && !content.is_empty())
        .then(|| StoryChanges { title: title.to_owned(), content: content.to_owned() })
}

impl Mutations {
    pub async fn create_story(&self, title: &str, content: &str) -> Result<Story, ServiceError> {
        let Some(changes) = validated(title, content) else {
            self.notices.error(MISSING_FIELDS);
            return Err(ServiceError::InvalidInput(MISSING_FIELDS.to_owned()));
        };
        let (epoch, user_id) = self.state.active()?;
        let temp = TempId::new();
        let now = self.clock.now();
        let record = Story {
            id: 0,
            user_id: user_id.clone(),
            created_at: now,
            updated_at: now,
            title: changes.title.clone(),
            content: changes.content.clone(),
        };
        self.state
            .update_data(epoch, |data| data.stories.insert(0, Entry::pending(temp, record)))
            .ok_or(ServiceError::NoSession)?;

        let request = NewStory { user_id: user_id.clone(), title: changes.title, content: changes.content };
        match within(self.timeout, "story insert", self.store.insert_story(&request)).await {
            Ok(saved) => {
                self.state.update_data(epoch, |data| reconcile(&mut data.stories, temp, saved.clone()));
                Ok(saved)
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "story insert failed, rolling back");
                self.state.update_data(epoch, |data| discard(&mut data.stories, temp));
                self.notices.error("Could not save new story. Please try again.");
                Err(e)
            },
        }
    }

    /// Edit a story; it moves to the front as the most recently updated.
    pub async fn update_story(
        &self,
        id: RecordId,
        title: &str,
        content: &str,
    ) -> Result<Story, ServiceError> {
        let Some(changes) = validated(title, content) else {
            self.notices.error(MISSING_FIELDS);
            return Err(ServiceError::InvalidInput(MISSING_FIELDS.to_owned()));
        };
        let (epoch, user_id) = self.state.active()?;
        let temp = TempId::new();
        let now = self.clock.now();
        let moved = self
            .state
            .update_data(epoch, |data| {
                let idx = data.stories.iter().position(|e| !e.is_pending() && e.record().id == id)?;
                let previous = data.stories.remove(idx);
                let mut record = previous.record().clone();
                record.title.clone_from(&changes.title);
                record.content.clone_from(&changes.content);
                record.updated_at = now;
                data.stories.insert(0, Entry::pending(temp, record));
                Some((idx, previous))
            })
            .ok_or(ServiceError::NoSession)?;
        let Some((idx, previous)) = moved else {
            return Err(ServiceError::InvalidInput(format!("no story {id}")));
        };

        match within(self.timeout, "story update", self.store.update_story(&user_id, id, &changes)).await {
            Ok(saved) => {
                self.state.update_data(epoch, |data| reconcile(&mut data.stories, temp, saved.clone()));
                Ok(saved)
            },
            Err(e) => {
                tracing::warn!(user_id, id, error = %e, "story update failed, rolling back");
                self.state.update_data(epoch, |data| {
                    if position_of(&data.stories, temp).is_some() {
                        discard(&mut data.stories, temp);
                        let idx = idx.min(data.stories.len());
                        data.stories.insert(idx, previous);
                    }
                });
                self.notices.error("Could not update story. Please try again.");
                Err(e)
            },
        }
    }

    pub async fn delete_story(&self, id: RecordId) -> Result<(), ServiceError> {
        let (epoch, user_id) = self.state.active()?;
        let removed = self
            .state
            .update_data(epoch, |data| {
                let idx = data.stories.iter().position(|e| !e.is_pending() && e.record().id == id)?;
                Some((idx, data.stories.remove(idx)))
            })
            .ok_or(ServiceError::NoSession)?;
        let Some((idx, previous)) = removed else {
            return Err(ServiceError::InvalidInput(format!("no story {id}")));
        };

        match within(self.timeout, "story delete", self.store.delete_story(&user_id, id)).await {
            Ok(()) => {
                self.state.update_view(|view| {
                    if view.epoch == epoch && view.active_story == Some(id) {
                        view.active_story = None;
                    }
                });
                Ok(())
            },
            Err(e) => {
                tracing::warn!(user_id, id, error = %e, "story delete failed, restoring");
                self.state.update_data(epoch, |data| {
                    let idx = idx.min(data.stories.len());
                    data.stories.insert(idx, previous);
                });
                self.notices.error("Could not delete story. Please try again.");
                Err(e)
            },
        }
    }
}
