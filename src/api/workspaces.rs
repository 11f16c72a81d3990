use serde_json::Value;

use crate::cache::QueryCache;
use crate::errors::ClientError;
use crate::models::workspace::{
    Board, BoardList, Card, CreateBoardListRequest, CreateBoardRequest, CreateCardCommentRequest,
    CreateCardRequest, CreateWorkspaceRequest, InviteMemberRequest, MemberRole,
    UpdateBoardRequest, UpdateCardRequest, UpdateWorkspaceRequest, Workspace,
    WorkspaceMembership,
};

use super::http::{list_from_value, object_from_value, ApiClient};
use super::keys;

/// Workspaces and everything nested under them: members and invites, boards,
/// board lists, cards, and card comments. Paths mirror the server's nested
/// URL layout.
pub struct WorkspacesApi<'a> {
    http: &'a ApiClient,
    cache: &'a QueryCache,
}

impl<'a> WorkspacesApi<'a> {
    pub(crate) fn new(http: &'a ApiClient, cache: &'a QueryCache) -> Self {
        Self { http, cache }
    }

    // ── Workspaces ────────────────────────────────────────────

    pub async fn list(&self) -> Result<Vec<Workspace>, ClientError> {
        if let Some(cached) = self.cache.get::<Vec<Workspace>>(keys::WORKSPACES) {
            return Ok(cached);
        }
        let value = self.http.get("workspaces/").await?;
        let items: Vec<Workspace> = list_from_value(value)?;
        self.cache.set(keys::WORKSPACES, &items);
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> Result<Workspace, ClientError> {
        let key = keys::workspace(id);
        if let Some(cached) = self.cache.get::<Workspace>(&key) {
            return Ok(cached);
        }
        let value = self.http.get(&format!("workspaces/{id}/")).await?;
        let workspace: Workspace = object_from_value(value)?;
        self.cache.set(&key, &workspace);
        Ok(workspace)
    }

    pub async fn create(&self, input: &CreateWorkspaceRequest) -> Result<Workspace, ClientError> {
        let value = self
            .http
            .post("workspaces/", Some(serde_json::to_value(input)?))
            .await?;
        let workspace: Workspace = object_from_value(value)?;
        self.cache.invalidate(keys::WORKSPACES);
        Ok(workspace)
    }

    pub async fn update(
        &self,
        id: &str,
        input: &UpdateWorkspaceRequest,
    ) -> Result<Workspace, ClientError> {
        let value = self
            .http
            .patch(&format!("workspaces/{id}/"), Some(serde_json::to_value(input)?))
            .await?;
        let workspace: Workspace = object_from_value(value)?;
        self.cache.invalidate(&keys::workspace(id));
        self.cache.invalidate(keys::WORKSPACES);
        Ok(workspace)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.http.delete(&format!("workspaces/{id}/")).await?;
        self.cache.invalidate(keys::WORKSPACES);
        Ok(())
    }

    // ── Members & invites ─────────────────────────────────────

    pub async fn members(&self, workspace_id: &str) -> Result<Vec<WorkspaceMembership>, ClientError> {
        let key = keys::workspace_members(workspace_id);
        if let Some(cached) = self.cache.get::<Vec<WorkspaceMembership>>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!("workspaces/{workspace_id}/members/"))
            .await?;
        let items: Vec<WorkspaceMembership> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    pub async fn invite_member(
        &self,
        workspace_id: &str,
        input: &InviteMemberRequest,
    ) -> Result<Value, ClientError> {
        let value = self
            .http
            .post(
                &format!("workspaces/{workspace_id}/invite/"),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        self.cache.invalidate(&keys::workspace_members(workspace_id));
        Ok(value)
    }

    pub async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<(), ClientError> {
        self.http
            .delete(&format!("workspaces/{workspace_id}/members/{user_id}/"))
            .await?;
        self.cache.invalidate(&keys::workspace_members(workspace_id));
        Ok(())
    }

    pub async fn generate_invite_link(
        &self,
        workspace_id: &str,
        role: MemberRole,
    ) -> Result<Value, ClientError> {
        self.http
            .post(
                &format!("workspaces/{workspace_id}/generate-invite-link/"),
                Some(serde_json::json!({ "role": role })),
            )
            .await
    }

    pub async fn accept_invitation(&self, token: &str) -> Result<Value, ClientError> {
        let value = self
            .http
            .post(&format!("workspaces/invitations/{token}/accept/"), None)
            .await?;
        self.cache.invalidate(keys::WORKSPACES);
        Ok(value)
    }

    /// Join by invite code. If the response carries the joined workspace,
    /// seed it into the cache so the next `get` is immediate.
    pub async fn join_by_code(&self, code: &str) -> Result<Value, ClientError> {
        let value = self
            .http
            .post("workspaces/join/", Some(serde_json::json!({ "code": code })))
            .await?;
        self.cache.invalidate(keys::WORKSPACES);

        if let Ok(workspace) = object_from_value::<Workspace>(
            value.get("workspace").cloned().unwrap_or(Value::Null),
        ) {
            self.cache.set(&keys::workspace(&workspace.id), &workspace);
        }
        Ok(value)
    }

    // ── Boards ────────────────────────────────────────────────

    pub async fn boards(&self, workspace_id: &str) -> Result<Vec<Board>, ClientError> {
        let key = keys::boards(workspace_id);
        if let Some(cached) = self.cache.get::<Vec<Board>>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!("workspaces/{workspace_id}/boards/"))
            .await?;
        let items: Vec<Board> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    pub async fn board(&self, workspace_id: &str, board_id: &str) -> Result<Board, ClientError> {
        let key = keys::board(workspace_id, board_id);
        if let Some(cached) = self.cache.get::<Board>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!("workspaces/{workspace_id}/boards/{board_id}/"))
            .await?;
        let board: Board = object_from_value(value)?;
        self.cache.set(&key, &board);
        Ok(board)
    }

    pub async fn create_board(
        &self,
        workspace_id: &str,
        input: &CreateBoardRequest,
    ) -> Result<Board, ClientError> {
        let value = self
            .http
            .post(
                &format!("workspaces/{workspace_id}/boards/"),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        let board: Board = object_from_value(value)?;
        self.cache.invalidate(&keys::boards(workspace_id));
        Ok(board)
    }

    pub async fn update_board(
        &self,
        workspace_id: &str,
        board_id: &str,
        input: &UpdateBoardRequest,
    ) -> Result<Board, ClientError> {
        let value = self
            .http
            .patch(
                &format!("workspaces/{workspace_id}/boards/{board_id}/"),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        let board: Board = object_from_value(value)?;
        self.cache.invalidate(&keys::boards(workspace_id));
        Ok(board)
    }

    pub async fn delete_board(&self, workspace_id: &str, board_id: &str) -> Result<(), ClientError> {
        self.http
            .delete(&format!("workspaces/{workspace_id}/boards/{board_id}/"))
            .await?;
        self.cache.invalidate(&keys::boards(workspace_id));
        Ok(())
    }

    // ── Board lists ───────────────────────────────────────────

    pub async fn create_list(
        &self,
        workspace_id: &str,
        board_id: &str,
        input: &CreateBoardListRequest,
    ) -> Result<BoardList, ClientError> {
        let value = self
            .http
            .post(
                &format!("workspaces/{workspace_id}/boards/{board_id}/lists/"),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        let list: BoardList = object_from_value(value)?;
        self.cache.invalidate(&keys::board(workspace_id, board_id));
        Ok(list)
    }

    pub async fn delete_list(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
    ) -> Result<(), ClientError> {
        self.http
            .delete(&format!(
                "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/"
            ))
            .await?;
        self.cache.invalidate(&keys::board(workspace_id, board_id));
        Ok(())
    }

    // ── Cards ─────────────────────────────────────────────────

    pub async fn create_card(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        input: &CreateCardRequest,
    ) -> Result<Card, ClientError> {
        let value = self
            .http
            .post(
                &format!("workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/"),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        let card: Card = object_from_value(value)?;
        self.cache.invalidate(&keys::board(workspace_id, board_id));
        Ok(card)
    }

    pub async fn update_card(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        input: &UpdateCardRequest,
    ) -> Result<Card, ClientError> {
        let value = self
            .http
            .patch(
                &format!(
                    "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/{card_id}/"
                ),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        let card: Card = object_from_value(value)?;
        self.cache.invalidate(&keys::board(workspace_id, board_id));
        Ok(card)
    }

    pub async fn delete_card(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        card_id: &str,
    ) -> Result<(), ClientError> {
        self.http
            .delete(&format!(
                "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/{card_id}/"
            ))
            .await?;
        self.cache.invalidate(&keys::board(workspace_id, board_id));
        Ok(())
    }

    // ── Card comments ─────────────────────────────────────────

    pub async fn card_comments(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        card_id: &str,
    ) -> Result<Vec<Value>, ClientError> {
        let key = keys::card_comments(workspace_id, board_id, card_id);
        if let Some(cached) = self.cache.get::<Vec<Value>>(&key) {
            return Ok(cached);
        }
        let value = self
            .http
            .get(&format!(
                "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/{card_id}/comments/"
            ))
            .await?;
        let items: Vec<Value> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    pub async fn create_card_comment(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        input: &CreateCardCommentRequest,
    ) -> Result<Value, ClientError> {
        let value = self
            .http
            .post(
                &format!(
                    "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/{card_id}/comments/"
                ),
                Some(serde_json::to_value(input)?),
            )
            .await?;
        self.cache
            .invalidate(&keys::card_comments(workspace_id, board_id, card_id));
        object_from_value(value)
    }

    pub async fn update_card_comment(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<Value, ClientError> {
        let value = self
            .http
            .patch(
                &format!(
                    "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/{card_id}/comments/{comment_id}/"
                ),
                Some(serde_json::json!({ "text": text })),
            )
            .await?;
        self.cache
            .invalidate(&keys::card_comments(workspace_id, board_id, card_id));
        Ok(value)
    }

    pub async fn delete_card_comment(
        &self,
        workspace_id: &str,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        comment_id: &str,
    ) -> Result<(), ClientError> {
        self.http
            .delete(&format!(
                "workspaces/{workspace_id}/boards/{board_id}/lists/{list_id}/cards/{card_id}/comments/{comment_id}/"
            ))
            .await?;
        self.cache
            .invalidate(&keys::card_comments(workspace_id, board_id, card_id));
        Ok(())
    }
}
