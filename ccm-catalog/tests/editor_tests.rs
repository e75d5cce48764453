//! Integration tests for the course editing workflow

use ccm_catalog::store::CourseStore;
use ccm_catalog::{CourseEditor, CourseForm};
use ccm_common::db::init_database;
use ccm_common::events::EventBus;
use ccm_common::Error;
use tempfile::TempDir;

async fn editor() -> (TempDir, CourseStore, CourseEditor) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ccm.db")).await.unwrap();
    let courses = CourseStore::new(pool, EventBus::new(16));
    let editor = CourseEditor::new(courses.clone());
    (dir, courses, editor)
}

fn valid_form() -> CourseForm {
    CourseForm {
        title: "Go ".to_string(),
        description: "Intro".to_string(),
        category_id: Some("Tools".to_string()),
        lessons: "4".to_string(),
    }
}

fn message(err: Error) -> String {
    err.to_string()
}

#[tokio::test]
async fn save_creates_course_with_trimmed_title_and_derived_score() {
    let (_dir, courses, editor) = editor().await;

    let saved = editor.save(None, &valid_form()).await.unwrap();
    assert_eq!(saved.title, "Go");
    assert_eq!(saved.score, 8); // 2 characters * 4 lessons
    assert_eq!(saved.updated_at, Some(saved.created_at));
    assert!(!saved.id.is_empty());

    let stored = courses.get_by_id(&saved.id).await.unwrap().unwrap();
    assert_eq!(stored, saved);
}

#[tokio::test]
async fn score_counts_code_points_not_bytes() {
    let (_dir, _, editor) = editor().await;

    let form = CourseForm {
        title: "日本語".to_string(),
        lessons: "2".to_string(),
        ..valid_form()
    };
    let saved = editor.save(None, &form).await.unwrap();
    assert_eq!(saved.score, 6); // 3 code points * 2 lessons
}

#[tokio::test]
async fn validation_order_is_title_description_category_lessons() {
    let (_dir, _, editor) = editor().await;

    // Everything invalid: title wins
    let form = CourseForm {
        title: "   ".to_string(),
        description: String::new(),
        category_id: None,
        lessons: "0".to_string(),
    };
    assert_eq!(
        message(editor.save(None, &form).await.unwrap_err()),
        "Title is required"
    );

    let form = CourseForm {
        title: "T".to_string(),
        description: "  ".to_string(),
        category_id: None,
        lessons: "0".to_string(),
    };
    assert_eq!(
        message(editor.save(None, &form).await.unwrap_err()),
        "Description is required"
    );

    let form = CourseForm {
        title: "T".to_string(),
        description: "D".to_string(),
        category_id: Some("  ".to_string()),
        lessons: "0".to_string(),
    };
    assert_eq!(
        message(editor.save(None, &form).await.unwrap_err()),
        "Category required"
    );

    let form = CourseForm {
        title: "T".to_string(),
        description: "D".to_string(),
        category_id: Some("Tools".to_string()),
        lessons: "0".to_string(),
    };
    assert_eq!(
        message(editor.save(None, &form).await.unwrap_err()),
        "Lessons must be > 0"
    );
}

#[tokio::test]
async fn non_numeric_lessons_is_rejected() {
    let (_dir, _, editor) = editor().await;

    let form = CourseForm {
        lessons: "four".to_string(),
        ..valid_form()
    };
    assert_eq!(
        message(editor.save(None, &form).await.unwrap_err()),
        "Lessons must be > 0"
    );
}

#[tokio::test]
async fn update_keeps_original_created_at() {
    let (_dir, courses, editor) = editor().await;

    let created = editor.save(None, &valid_form()).await.unwrap();

    let edited_form = CourseForm {
        title: "Rust".to_string(),
        ..valid_form()
    };
    let updated = editor
        .save(Some(created.id.as_str()), &edited_form)
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at.unwrap() >= created.created_at);

    let stored = courses.get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Rust");
    assert_eq!(stored.score, 16); // 4 characters * 4 lessons
    assert_eq!(stored.created_at, created.created_at);
}

#[tokio::test]
async fn update_of_vanished_id_persists_nothing() {
    let (_dir, courses, editor) = editor().await;

    let result = editor.save(Some("vanished"), &valid_form()).await;
    assert!(result.is_ok());
    assert!(courses.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn load_prefills_form_from_stored_course() {
    let (_dir, _, editor) = editor().await;

    let saved = editor.save(None, &valid_form()).await.unwrap();
    let form = editor.load(&saved.id).await.unwrap().unwrap();

    assert_eq!(form.title, "Go");
    assert_eq!(form.description, "Intro");
    assert_eq!(form.category_id.as_deref(), Some("Tools"));
    assert_eq!(form.lessons, "4");
}

#[tokio::test]
async fn load_of_missing_id_is_none() {
    let (_dir, _, editor) = editor().await;
    assert!(editor.load("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn saving_flag_cleared_after_storage_fault() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ccm.db")).await.unwrap();
    let courses = CourseStore::new(pool.clone(), EventBus::new(16));
    let editor = CourseEditor::new(courses);

    // Closing the pool makes the insert fail with a storage fault
    pool.close().await;

    let result = editor.save(None, &valid_form()).await;
    assert!(matches!(result, Err(Error::Database(_))));
    assert!(!editor.is_saving());
}

#[tokio::test]
async fn saving_flag_cleared_after_success() {
    let (_dir, _, editor) = editor().await;
    editor.save(None, &valid_form()).await.unwrap();
    assert!(!editor.is_saving());
}
