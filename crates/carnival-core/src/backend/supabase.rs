//! Supabase REST (PostgREST) implementation of `NotesBackend`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::NotesBackend;
use crate::auth::{parse_api_error, AuthSession, SessionPersistence, SupabaseAuthClient};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{Identity, NewNote, Note, NoteId, NoteSummary, NoteUpdate};

const NOTES_TABLE: &str = "notes";
const LIST_COLUMNS: &str = "id,title,content,updated_at";

#[derive(Clone)]
pub struct SupabaseNotesBackend<S: SessionPersistence> {
    notes_url: String,
    anon_key: String,
    client: Client,
    auth: SupabaseAuthClient<S>,
}

impl<S: SessionPersistence> SupabaseNotesBackend<S> {
    pub fn new(config: &ClientConfig, store: S) -> Result<Self> {
        let auth = SupabaseAuthClient::new(
            config.base_url(),
            config.supabase_anon_key.clone(),
            store,
        )?;

        Ok(Self {
            notes_url: format!("{}/{NOTES_TABLE}", config.rest_url()),
            anon_key: config.supabase_anon_key.clone(),
            client: Client::builder().build()?,
            auth,
        })
    }

    /// The auth client sharing this backend's session store.
    pub const fn auth(&self) -> &SupabaseAuthClient<S> {
        &self.auth
    }

    async fn session(&self) -> Result<AuthSession> {
        self.auth
            .restore_session()
            .await?
            .ok_or(Error::AuthRequired)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let session = self.session().await?;
        Ok(request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_error_status(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl<S: SessionPersistence> NotesBackend for SupabaseNotesBackend<S> {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        Ok(self
            .auth
            .restore_session()
            .await?
            .map(|session| session.user))
    }

    async fn list_notes(&self, owner: &Identity) -> Result<Vec<NoteSummary>> {
        let request = self
            .client
            .get(&self.notes_url)
            .query(&list_query(owner));
        let notes: Vec<NoteSummary> = self.send_json(request).await?;
        tracing::debug!("Fetched {} notes for {}", notes.len(), owner);
        Ok(notes)
    }

    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let request = self.client.get(&self.notes_url).query(&get_query(id));
        let mut rows: Vec<Note> = self.send_json(request).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        let request = self
            .client
            .post(&self.notes_url)
            .header("Prefer", "return=representation")
            .json(&[note]);
        let rows: Vec<Note> = self.send_json(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Backend("Insert did not return the new row".to_string()))
    }

    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<()> {
        let request = self
            .client
            .patch(&self.notes_url)
            .query(&id_filter(id))
            .header("Prefer", "return=minimal")
            .json(update);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let request = self.client.delete(&self.notes_url).query(&id_filter(id));
        self.send(request).await?;
        Ok(())
    }
}

fn list_query(owner: &Identity) -> Vec<(&'static str, String)> {
    vec![
        ("select", LIST_COLUMNS.to_string()),
        ("user_id", format!("eq.{}", owner.id)),
        ("order", "updated_at.desc".to_string()),
    ]
}

fn get_query(id: &NoteId) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("id", format!("eq.{id}")),
        ("limit", "1".to_string()),
    ]
}

fn id_filter(id: &NoteId) -> Vec<(&'static str, String)> {
    vec![("id", format!("eq.{id}"))]
}

fn map_error_status(status: StatusCode, body: &str) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        Error::AuthRequired
    } else {
        Error::Backend(parse_api_error(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_query_filters_by_owner_and_orders_by_recency() {
        let query = list_query(&Identity::new("user-a"));
        assert_eq!(
            query,
            vec![
                ("select", "id,title,content,updated_at".to_string()),
                ("user_id", "eq.user-a".to_string()),
                ("order", "updated_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn get_query_targets_single_id() {
        let id: NoteId = "11111111-1111-7111-8111-111111111111".parse().unwrap();
        let query = get_query(&id);
        assert!(query.contains(&("id", "eq.11111111-1111-7111-8111-111111111111".to_string())));
        assert!(query.contains(&("limit", "1".to_string())));
    }

    #[test]
    fn unauthorized_maps_to_auth_required() {
        assert!(matches!(
            map_error_status(StatusCode::UNAUTHORIZED, ""),
            Error::AuthRequired
        ));
        let error = map_error_status(
            StatusCode::BAD_REQUEST,
            r#"{"code":"PGRST100","message":"failed to parse filter"}"#,
        );
        assert_eq!(
            error.to_string(),
            "Backend error: failed to parse filter (400)"
        );
    }

    #[test]
    fn notes_url_uses_rest_endpoint() {
        let config = ClientConfig::new("https://project.supabase.co", "anon").unwrap();
        let backend = SupabaseNotesBackend::new(&config, MemorySessionStore::default()).unwrap();
        assert_eq!(
            backend.notes_url,
            "https://project.supabase.co/rest/v1/notes"
        );
    }

    #[tokio::test]
    async fn no_session_means_no_identity_and_auth_required() {
        let config = ClientConfig::new("http://127.0.0.1:9", "anon").unwrap();
        let backend = SupabaseNotesBackend::new(&config, MemorySessionStore::default()).unwrap();
        assert!(backend.current_identity().await.unwrap().is_none());
        assert!(matches!(
            backend.list_notes(&Identity::new("user-a")).await,
            Err(Error::AuthRequired)
        ));
    }
}
