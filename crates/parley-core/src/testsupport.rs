//! In-memory repository fakes shared by the service tests.
//!
//! These back the repository traits with `Mutex<Vec<_>>` storage and a
//! couple of failure-injection switches for exercising the ingest
//! pipeline's partial-failure paths.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatKey, Message};
use parley_types::error::RepositoryError;
use parley_types::lead::{Lead, User};
use uuid::Uuid;

use crate::repository::{ChatRepository, MessageRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryChatRepository {
    chats: Mutex<Vec<Chat>>,
    /// When set, `update_chat_summary` fails with a Query error.
    pub fail_summary_updates: AtomicBool,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chat_count(&self) -> usize {
        self.chats.lock().unwrap().len()
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        if chats.iter().any(|c| c.key() == chat.key()) {
            return Err(RepositoryError::Conflict(format!(
                "chat already exists for pair ({}, {})",
                chat.participant_a, chat.participant_b
            )));
        }
        chats.push(chat.clone());
        Ok(())
    }

    async fn get_chat(&self, chat_id: &Uuid) -> Result<Option<Chat>, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *chat_id)
            .cloned())
    }

    async fn find_chat_by_pair(&self, key: &ChatKey) -> Result<Option<Chat>, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.key() == *key)
            .cloned())
    }

    async fn update_chat_summary(
        &self,
        chat_id: &Uuid,
        latest_message: &str,
        latest_from: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if self.fail_summary_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("summary update refused".to_string()));
        }
        let mut chats = self.chats.lock().unwrap();
        match chats.iter_mut().find(|c| c.id == *chat_id) {
            Some(chat) => {
                chat.latest_message = latest_message.to_string();
                chat.latest_from = latest_from.map(str::to_string);
                chat.updated_at = updated_at;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list_chats_for(&self, participant: &str) -> Result<Vec<Chat>, RepositoryError> {
        let mut chats: Vec<Chat> = self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.has_participant(participant))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        Ok(self.chats.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
    /// When set, `insert_message` fails with a Query error.
    pub fail_inserts: AtomicBool,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl MessageRepository for InMemoryMessageRepository {
    async fn insert_message(&self, message: &Message) -> Result<(), RepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("insert refused".to_string()));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, chat_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let mut messages: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == *chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn list_all_messages(&self) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = self.messages.lock().unwrap().clone();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn list_messages_by_sender(&self, sender: &str) -> Result<Vec<Message>, RepositoryError> {
        let mut messages: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.sender == sender)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self.messages.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    leads: Mutex<Vec<Lead>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            leads: Mutex::new(Vec::new()),
        }
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn insert_leads(&self, leads: &[Lead]) -> Result<(), RepositoryError> {
        self.leads.lock().unwrap().extend_from_slice(leads);
        Ok(())
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        Ok(self.leads.lock().unwrap().clone())
    }
}
