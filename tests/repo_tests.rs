use kanban_board::error::AppError;
use kanban_board::state::AppState;
use kanban_board::{db, test_utils};
use uuid::Uuid;

async fn count(state: &AppState, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(state.pool.as_ref())
        .await
        .unwrap()
}

/// Owner `alice` with member `bobby` on a board holding one column and one card.
async fn shared_card(state: &AppState) -> (Uuid, Uuid, Uuid, Uuid) {
    let alice = test_utils::create_test_user(state, "alice").await;
    let bobby = test_utils::create_test_user(state, "bobby").await;

    let board = state.boards.create("Roadmap", alice.id).await.unwrap();
    let access = state.boards.load_access(board.id).await.unwrap();
    state.boards.invite(&access, "bobby").await.unwrap();

    let column = state.columns.create(board.id, "Todo").await.unwrap();
    let access = state.boards.load_access(board.id).await.unwrap();
    let card = state
        .cards
        .create(&access, column.id, "Task", None, &[bobby.id], &[])
        .await
        .unwrap();

    (alice.id, bobby.id, board.id, card.id)
}

#[tokio::test]
async fn test_board_delete_leaves_nothing_behind() {
    let state = test_utils::create_test_state().await;
    let (alice, bobby, board_id, card_id) = shared_card(&state).await;

    let tag = state.tags.create(board_id, "bug", "#ff0000").await.unwrap();
    state.cards.set_tags(board_id, card_id, &[tag.id]).await.unwrap();
    state.comments.create(card_id, alice, "First").await.unwrap();
    state.comments.create(card_id, bobby, "Second").await.unwrap();

    state.boards.delete(board_id).await.unwrap();

    for table in [
        "boards",
        "board_members",
        "columns",
        "cards",
        "card_assignees",
        "tags",
        "card_tags",
        "comments",
    ] {
        assert_eq!(count(&state, table).await, 0, "{} not empty", table);
    }
    assert_eq!(count(&state, "users").await, 2);

    assert!(matches!(
        state.boards.delete(board_id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_set_assignees_twice_changes_nothing() {
    let state = test_utils::create_test_state().await;
    let (alice, bobby, board_id, card_id) = shared_card(&state).await;
    let outsider = test_utils::create_test_user(&state, "carol").await;
    let access = state.boards.load_access(board_id).await.unwrap();

    let requested = [alice, outsider.id, bobby, alice];
    let first = state
        .cards
        .set_assignees(&access, card_id, &requested)
        .await
        .unwrap();
    assert_eq!(first.added, vec![alice]);
    assert!(first.removed.is_empty());

    let second = state
        .cards
        .set_assignees(&access, card_id, &requested)
        .await
        .unwrap();
    assert!(second.is_empty());

    let assignees: Vec<Uuid> = state
        .cards
        .list_assignees(card_id)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(assignees, vec![alice, bobby]);
}

#[tokio::test]
async fn test_remove_member_only_touches_that_board() {
    let state = test_utils::create_test_state().await;
    let (alice, bobby, board_id, card_id) = shared_card(&state).await;

    // Bobby is also assigned on a board of his own
    let own_board = state.boards.create("Side project", bobby).await.unwrap();
    let own_column = state.columns.create(own_board.id, "Todo").await.unwrap();
    let own_access = state.boards.load_access(own_board.id).await.unwrap();
    let own_card = state
        .cards
        .create(&own_access, own_column.id, "Mine", None, &[bobby], &[])
        .await
        .unwrap();

    let unassigned = state.boards.remove_member(board_id, bobby).await.unwrap();
    assert_eq!(unassigned, 1);

    assert!(state.cards.list_assignees(card_id).await.unwrap().is_empty());
    assert_eq!(state.cards.list_assignees(own_card.id).await.unwrap().len(), 1);

    let access = state.boards.load_access(board_id).await.unwrap();
    assert!(access.is_owner(alice));
    assert!(!access.can_edit(bobby));

    assert!(matches!(
        state.boards.remove_member(board_id, bobby).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_invite_rejects_owner_and_existing_member() {
    let state = test_utils::create_test_state().await;
    let (_alice, _bobby, board_id, _card_id) = shared_card(&state).await;
    let access = state.boards.load_access(board_id).await.unwrap();

    assert!(matches!(
        state.boards.invite(&access, "alice@example.com").await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        state.boards.invite(&access, "bobby").await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        state.boards.invite(&access, "nobody").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_invite_prefers_email_over_matching_username() {
    let state = test_utils::create_test_state().await;
    let alice = test_utils::create_test_user(&state, "alice").await;
    // Registered before dana, with a username equal to dana's email
    let password_hash = kanban_board::auth::hash_password(test_utils::TEST_PASSWORD).unwrap();
    let lookalike = state
        .users
        .create(Uuid::new_v4(), "dana@example.com", "erin@example.com", &password_hash)
        .await
        .unwrap();
    let dana = test_utils::create_test_user(&state, "dana").await;

    let board = state.boards.create("Roadmap", alice.id).await.unwrap();
    let access = state.boards.load_access(board.id).await.unwrap();
    let invited = state
        .boards
        .invite(&access, "dana@example.com")
        .await
        .unwrap();
    assert_eq!(invited.id, dana.id);

    let access = state.boards.load_access(board.id).await.unwrap();
    assert!(access.can_edit(dana.id));
    assert!(!access.can_edit(lookalike.id));
}

#[tokio::test]
async fn test_delete_user_cleans_up_relations() {
    let state = test_utils::create_test_state().await;
    let (alice, bobby, _board_id, card_id) = shared_card(&state).await;
    state.comments.create(card_id, bobby, "On it").await.unwrap();
    test_utils::create_test_session(&state, bobby).await;

    assert!(matches!(
        state.users.delete(alice).await,
        Err(AppError::Conflict(_))
    ));

    state.users.delete(bobby).await.unwrap();

    assert_eq!(count(&state, "board_members").await, 0);
    assert_eq!(count(&state, "card_assignees").await, 0);
    assert_eq!(count(&state, "comments").await, 0);
    assert_eq!(count(&state, "sessions").await, 0);
    assert_eq!(count(&state, "cards").await, 1);
}

#[tokio::test]
async fn test_expired_sessions_are_ignored_and_purged() {
    let state = test_utils::create_test_state().await;
    let alice = test_utils::create_test_user(&state, "alice").await;

    state
        .sessions
        .create(alice.id, "stale-hash", chrono::Duration::days(-1))
        .await
        .unwrap();
    let live = test_utils::create_test_session(&state, alice.id).await;

    assert!(state
        .sessions
        .find_by_token_hash("stale-hash")
        .await
        .unwrap()
        .is_none());
    assert!(state
        .sessions
        .find_by_token_hash(&kanban_board::auth::hash_token(&live))
        .await
        .unwrap()
        .is_some());

    assert_eq!(state.sessions.delete_expired().await.unwrap(), 1);
    assert_eq!(count(&state, "sessions").await, 1);
}

#[tokio::test]
async fn test_session_expiry_overflow_is_an_error() {
    let state = test_utils::create_test_state().await;
    let alice = test_utils::create_test_user(&state, "alice").await;

    assert!(matches!(
        state
            .sessions
            .create(alice.id, "far-future", chrono::Duration::MAX)
            .await,
        Err(AppError::Internal(_))
    ));
    assert_eq!(count(&state, "sessions").await, 0);
}

#[tokio::test]
async fn test_tag_names_scoped_to_board() {
    let state = test_utils::create_test_state().await;
    let alice = test_utils::create_test_user(&state, "alice").await;
    let roadmap = state.boards.create("Roadmap", alice.id).await.unwrap();
    let other = state.boards.create("Other", alice.id).await.unwrap();

    state.tags.create(roadmap.id, "bug", "#808080").await.unwrap();
    assert!(matches!(
        state.tags.create(roadmap.id, "bug", "#000000").await,
        Err(AppError::Validation(_))
    ));
    state.tags.create(other.id, "bug", "#808080").await.unwrap();
}

#[tokio::test]
async fn test_cards_listed_in_insertion_order() {
    let state = test_utils::create_test_state().await;
    let (_alice, _bobby, board_id, first) = shared_card(&state).await;
    let access = state.boards.load_access(board_id).await.unwrap();
    let column_id = state.cards.get_by_id(first).await.unwrap().column_id;

    let mut expected = vec![first];
    for title in ["Second", "Third"] {
        let card = state
            .cards
            .create(&access, column_id, title, None, &[], &[])
            .await
            .unwrap();
        expected.push(card.id);
    }

    let listed: Vec<Uuid> = state
        .cards
        .list_by_column(column_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn test_file_database_persists_across_pools() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("kanban.db").display());

    let board_id = {
        let pool = db::connect(&url, 2).await.unwrap();
        let state = AppState::new(pool, Default::default());
        let alice = test_utils::create_test_user(&state, "alice").await;
        let board = state.boards.create("Roadmap", alice.id).await.unwrap();
        state.pool.close().await;
        board.id
    };

    let pool = db::connect(&url, 2).await.unwrap();
    let state = AppState::new(pool, Default::default());
    let board = state.boards.get_by_id(board_id).await.unwrap();
    assert_eq!(board.name, "Roadmap");
}
