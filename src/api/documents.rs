use crate::cache::QueryCache;
use crate::errors::ClientError;
use crate::models::document::{
    Block, Comment, CreateBlockRequest, CreateCommentRequest, CreateDocumentRequest, Document,
    DocumentPermission, UpdateBlockRequest, UpdateDocumentRequest,
};

use super::http::{list_from_value, object_from_value, ApiClient};
use super::keys;

pub struct DocumentsApi<'a> {
    http: &'a ApiClient,
    cache: &'a QueryCache,
}

impl<'a> DocumentsApi<'a> {
    pub(crate) fn new(http: &'a ApiClient, cache: &'a QueryCache) -> Self {
        Self { http, cache }
    }

    // ── Documents ─────────────────────────────────────────────

    pub async fn list(
        &self,
        workspace: Option<&str>,
        board: Option<&str>,
    ) -> Result<Vec<Document>, ClientError> {
        let key = keys::document_list(workspace, board);
        if let Some(cached) = self.cache.get::<Vec<Document>>(&key) {
            return Ok(cached);
        }

        let mut path = String::from("documents/?");
        if let Some(ws) = workspace {
            path.push_str(&format!("workspace={}&", urlencoding::encode(ws)));
        }
        if let Some(board) = board {
            path.push_str(&format!("board={}&", urlencoding::encode(board)));
        }
        let path = path.trim_end_matches(['&', '?']).to_string();

        let value = self.http.get(&path).await?;
        let items: Vec<Document> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> Result<Document, ClientError> {
        let key = keys::document(id);
        if let Some(cached) = self.cache.get::<Document>(&key) {
            return Ok(cached);
        }
        let value = self.http.get(&format!("documents/{id}/")).await?;
        let document: Document = object_from_value(value)?;
        self.cache.set(&key, &document);
        Ok(document)
    }

    pub async fn create(&self, input: &CreateDocumentRequest) -> Result<Document, ClientError> {
        let value = self
            .http
            .post("documents/", Some(serde_json::to_value(input)?))
            .await?;
        let document: Document = object_from_value(value)?;

        // Refresh the lists before seeding; the prefix sweep covers
        // `documents:*` and would mark a fresh seed stale.
        self.cache.invalidate(keys::DOCUMENTS);
        self.cache.set(&keys::document(&document.id), &document);
        Ok(document)
    }

    pub async fn update(
        &self,
        id: &str,
        input: &UpdateDocumentRequest,
    ) -> Result<Document, ClientError> {
        let value = self
            .http
            .patch(&format!("documents/{id}/"), Some(serde_json::to_value(input)?))
            .await?;
        let document: Document = object_from_value(value)?;
        self.cache.invalidate(&keys::document(id));
        Ok(document)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.http.delete(&format!("documents/{id}/")).await?;
        self.cache.invalidate(keys::DOCUMENTS);
        Ok(())
    }

    // ── Blocks ────────────────────────────────────────────────

    pub async fn blocks(&self, document_id: &str) -> Result<Vec<Block>, ClientError> {
        let key = keys::document_blocks(document_id);
        if let Some(cached) = self.cache.get::<Vec<Block>>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!("documents/{document_id}/blocks/"))
            .await?;
        let items: Vec<Block> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    pub async fn create_block(&self, input: &CreateBlockRequest) -> Result<Block, ClientError> {
        let document_id = input.document.clone();
        let value = self
            .http
            .post("blocks/", Some(serde_json::to_value(input)?))
            .await?;
        let block: Block = object_from_value(value)?;
        self.cache.invalidate(&keys::document_blocks(&document_id));
        Ok(block)
    }

    pub async fn update_block(
        &self,
        document_id: &str,
        block_id: &str,
        input: &UpdateBlockRequest,
    ) -> Result<Block, ClientError> {
        let value = self
            .http
            .patch(&format!("blocks/{block_id}/"), Some(serde_json::to_value(input)?))
            .await?;
        let block: Block = object_from_value(value)?;
        self.cache.invalidate(&keys::document_blocks(document_id));
        Ok(block)
    }

    pub async fn delete_block(&self, document_id: &str, block_id: &str) -> Result<(), ClientError> {
        self.http.delete(&format!("blocks/{block_id}/")).await?;
        self.cache.invalidate(&keys::document_blocks(document_id));
        Ok(())
    }

    // ── Comments ──────────────────────────────────────────────

    pub async fn comments(&self, document_id: &str) -> Result<Vec<Comment>, ClientError> {
        let key = keys::document_comments(document_id);
        if let Some(cached) = self.cache.get::<Vec<Comment>>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!("documents/{document_id}/comments/"))
            .await?;
        let items: Vec<Comment> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    pub async fn create_comment(&self, input: &CreateCommentRequest) -> Result<Comment, ClientError> {
        let document_id = input.document.clone();
        let value = self
            .http
            .post("comments/", Some(serde_json::to_value(input)?))
            .await?;
        let comment: Comment = object_from_value(value)?;
        self.cache
            .invalidate(&keys::document_comments(&document_id));
        Ok(comment)
    }

    pub async fn resolve_comment(
        &self,
        document_id: &str,
        comment_id: &str,
    ) -> Result<Comment, ClientError> {
        let value = self
            .http
            .post(&format!("comments/{comment_id}/resolve/"), None)
            .await?;
        let comment: Comment = object_from_value(value)?;
        self.cache.invalidate(&keys::document_comments(document_id));
        Ok(comment)
    }

    // ── Permissions ───────────────────────────────────────────

    pub async fn permissions(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentPermission>, ClientError> {
        let key = keys::document_permissions(document_id);
        if let Some(cached) = self.cache.get::<Vec<DocumentPermission>>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!("documents/{document_id}/permissions/"))
            .await?;
        let items: Vec<DocumentPermission> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }
}
