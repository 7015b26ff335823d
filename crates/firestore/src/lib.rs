//! Firestore-backed [`DocumentStore`] client.
//!
//! Talks to the Firestore REST API (`v1`) over HTTPS. Documents live under
//! `projects/{project}/databases/(default)/documents`, matching the layout
//! the existing web clients write to.
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::{Value, json};

use engine::store::{CollectionRef, Document, DocumentStore, Fields, StoreError};

mod value;

/// Client for one Firestore database.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    base_url: Url,
    root: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl FirestoreStore {
    /// Creates a client for `project_id` on the given API endpoint
    /// (`https://firestore.googleapis.com/v1` in production).
    pub fn new(base_url: &str, project_id: &str, token: Option<String>) -> Result<Self, StoreError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| StoreError::Unavailable(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            root: format!("projects/{project_id}/databases/(default)/documents"),
            token,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, relative: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(relative)
            .map_err(|err| StoreError::Unavailable(format!("invalid request path: {err}")))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }

    async fn fail(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unreadable response body".to_string());
        StoreError::Unavailable(format!("{status}: {body}"))
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, StoreError> {
        response
            .json::<Value>()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

/// The document id is the last segment of the resource name
/// (`projects/.../documents/budgets/abc` -> `abc`).
fn id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

fn decode_document(raw: &Value) -> Result<Document, StoreError> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Malformed {
            id: String::new(),
            reason: "document without a name".to_string(),
        })?;
    let id = id_from_name(name);
    let fields = raw
        .get("fields")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let fields = value::decode_fields(&fields).map_err(|reason| StoreError::Malformed {
        id: id.clone(),
        reason,
    })?;
    Ok(Document { id, fields })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn insert(&self, collection: &CollectionRef, fields: Fields) -> Result<String, StoreError> {
        let endpoint = self.endpoint(&format!("{}/{}", self.root, collection.path()))?;
        let body = json!({ "fields": value::encode_fields(&fields) });

        let response = self.send(self.http.post(endpoint).json(&body)).await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let created = Self::read_json(response).await?;
        let name = created
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Malformed {
                id: String::new(),
                reason: "create response without a name".to_string(),
            })?;
        Ok(id_from_name(name))
    }

    async fn get(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let endpoint = self.endpoint(&format!("{}/{}/{id}", self.root, collection.path()))?;

        let response = self.send(self.http.get(endpoint)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let raw = Self::read_json(response).await?;
        Ok(Some(decode_document(&raw)?))
    }

    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let endpoint = self.endpoint(&format!("{}/{}/{id}", self.root, collection.path()))?;
        // Mask the patch to the supplied fields and refuse to upsert.
        let mut params: Vec<(&str, String)> =
            vec![("currentDocument.exists", "true".to_string())];
        for name in fields.keys() {
            params.push(("updateMask.fieldPaths", name.clone()));
        }
        let body = json!({ "fields": value::encode_fields(&fields) });

        let response = self
            .send(self.http.patch(endpoint).query(&params).json(&body))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::Missing(format!("{}/{id}", collection.path())));
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(())
    }

    async fn delete(&self, collection: &CollectionRef, id: &str) -> Result<(), StoreError> {
        let endpoint = self.endpoint(&format!("{}/{}/{id}", self.root, collection.path()))?;

        let response = self.send(self.http.delete(endpoint)).await?;
        // Deleting an absent document succeeds upstream as well.
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(Self::fail(response).await)
    }

    async fn query_eq(
        &self,
        collection: &CollectionRef,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let parent = match collection.parent_document() {
            Some(document) => format!("{}/{document}", self.root),
            None => self.root.clone(),
        };
        let endpoint = self.endpoint(&format!("{parent}:runQuery"))?;
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection.leaf() }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": value::encode(value),
                    }
                },
            }
        });

        let response = self.send(self.http.post(endpoint).json(&body)).await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let raw = Self::read_json(response).await?;
        let entries = raw.as_array().cloned().unwrap_or_default();

        let mut documents = Vec::new();
        for entry in &entries {
            // Result batches may carry readTime-only entries with no document.
            if let Some(document) = entry.get("document") {
                documents.push(decode_document(document)?);
            }
        }
        tracing::debug!(
            collection = collection.path(),
            field,
            matches = documents.len(),
            "ran equality query"
        );
        Ok(documents)
    }

    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let endpoint = self.endpoint(&format!("{}/{}", self.root, collection.path()))?;

        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.http.get(endpoint.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = self.send(request).await?;
            if !response.status().is_success() {
                return Err(Self::fail(response).await);
            }
            let raw = Self::read_json(response).await?;

            let page = raw
                .get("documents")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for entry in &page {
                documents.push(decode_document(entry)?);
            }

            page_token = raw
                .get("nextPageToken")
                .and_then(Value::as_str)
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_strip_to_ids() {
        assert_eq!(
            id_from_name("projects/p/databases/(default)/documents/budgets/abc"),
            "abc"
        );
        assert_eq!(id_from_name("abc"), "abc");
    }

    #[test]
    fn documents_decode_from_rest_shape() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/budgets/b1",
            "fields": {
                "category": { "stringValue": "Food" },
                "total": { "integerValue": "1000" },
            },
            "createTime": "2024-05-01T00:00:00Z",
        });

        let document = decode_document(&raw).unwrap();
        assert_eq!(document.id, "b1");
        assert_eq!(document.fields["category"], json!("Food"));
        assert_eq!(document.fields["total"], json!(1000));
    }

    #[test]
    fn malformed_documents_are_reported_with_their_id() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/budgets/b1",
            "fields": { "total": { "integerValue": "ten" } },
        });

        match decode_document(&raw) {
            Err(StoreError::Malformed { id, .. }) => assert_eq!(id, "b1"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
