use std::collections::BTreeSet;

use validator::Validate;

use super::{load_board, task_views, user_summaries};
use crate::error::AppResult;
use crate::membership;
use crate::models::{
    BoardChanges, BoardDetail, BoardId, BoardInput, BoardSummary, BoardUpdateInput,
    BoardUpdateView, NewBoard, UserId,
};
use crate::policy::{authorize_board, ensure, BoardAction};
use crate::store::Store;

/// Boards the actor owns or belongs to. The filter is part of the query, so
/// there is nothing to authorize afterwards.
pub async fn list_boards(store: &dyn Store, actor: UserId) -> AppResult<Vec<BoardSummary>> {
    let boards = store.boards_for_user(actor).await?;
    let mut summaries = Vec::with_capacity(boards.len());
    for board in &boards {
        let tasks = store.tasks_for_board(board.id).await?;
        summaries.push(BoardSummary::new(board, &tasks));
    }
    Ok(summaries)
}

pub async fn create_board(
    store: &dyn Store,
    actor: UserId,
    input: BoardInput,
) -> AppResult<BoardSummary> {
    input.validate()?;

    let requested: BTreeSet<UserId> = input.members.iter().copied().chain([actor]).collect();
    let known = store.users_by_ids(&requested).await?;
    let members = membership::member_set(actor, &input.members, &known)?;

    let board = store
        .insert_board(NewBoard {
            title: input.title,
            owner_id: actor,
            members,
        })
        .await?;
    log::info!("user {} created board {}", actor, board.id);
    Ok(BoardSummary::new(&board, &[]))
}

pub async fn get_board(store: &dyn Store, actor: UserId, id: BoardId) -> AppResult<BoardDetail> {
    let board = load_board(store, id).await?;
    ensure(
        authorize_board(actor, BoardAction::Read, &board),
        format!("You are not a member of board {}", id),
    )?;

    let members = user_summaries(store, board.members.clone()).await?;
    let tasks = store.tasks_for_board(id).await?;
    let tasks = task_views(store, tasks).await?;

    Ok(BoardDetail {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members: board
            .members
            .iter()
            .filter_map(|member| members.get(member).cloned())
            .collect(),
        tasks,
    })
}

/// Replaces the title and/or member list. A member still linked to a task as
/// assignee or reviewer cannot be removed, and the whole update is rejected.
pub async fn update_board(
    store: &dyn Store,
    actor: UserId,
    id: BoardId,
    input: BoardUpdateInput,
) -> AppResult<BoardUpdateView> {
    let board = load_board(store, id).await?;
    ensure(
        authorize_board(actor, BoardAction::Write, &board),
        format!("You are not a member of board {}", id),
    )?;
    input.validate()?;

    let members = match &input.members {
        Some(requested) => {
            let ids: BTreeSet<UserId> = requested
                .iter()
                .copied()
                .chain([board.owner_id])
                .collect();
            let known = store.users_by_ids(&ids).await?;
            Some(membership::member_set(board.owner_id, requested, &known)?)
        }
        None => None,
    };

    // The store re-reads the board's tasks under its write lock and refuses
    // to drop a member still linked to one of them.
    let updated = store
        .update_board(
            id,
            BoardChanges {
                title: input.title,
                members,
            },
        )
        .await?;
    log::info!("user {} updated board {}", actor, id);

    let mut ids = updated.members.clone();
    ids.insert(updated.owner_id);
    let users = user_summaries(store, ids).await?;

    Ok(BoardUpdateView {
        id: updated.id,
        owner_data: users.get(&updated.owner_id).cloned(),
        members_data: updated
            .members
            .iter()
            .filter_map(|member| users.get(member).cloned())
            .collect(),
        title: updated.title,
    })
}

/// Owner only. Tasks and their comments go with the board.
pub async fn delete_board(store: &dyn Store, actor: UserId, id: BoardId) -> AppResult<()> {
    let board = load_board(store, id).await?;
    ensure(
        authorize_board(actor, BoardAction::Delete, &board),
        "Only the board owner can delete the board",
    )?;
    store.delete_board(id).await?;
    log::info!("user {} deleted board {}", actor, id);
    Ok(())
}
