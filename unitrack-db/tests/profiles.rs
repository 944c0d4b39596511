//! Profiles and their specialization rows

mod common;

use common::{profile, store};
use unitrack_core::{
    NewProfile, NewTeacherProfile, ProfileUpdate, Role, RoleProfile, StudentProfile,
    StudentProfileUpdate, TeacherProfileUpdate,
};
use unitrack_db::StoreError;
use uuid::Uuid;

#[tokio::test]
async fn create_profile_with_contact_details() {
    let store = store().await;
    let id = Uuid::new_v4();
    let new = NewProfile::new(id, Role::Student)
        .with_name(Some("Ada".into()), Some("Lovelace".into()))
        .with_email("ada@example.com");

    let created = store.profiles().create(&new).await.unwrap();
    assert_eq!(created.user_id, id);
    assert_eq!(created.role, Role::Student);
    assert_eq!(created.last_name.as_deref(), Some("Lovelace"));

    let by_email = store
        .profiles()
        .get_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email, created);
}

#[tokio::test]
async fn duplicate_user_id_or_email_is_rejected() {
    let store = store().await;
    let id = Uuid::new_v4();
    store
        .profiles()
        .create(&NewProfile::new(id, Role::Parent).with_email("p@example.com"))
        .await
        .unwrap();

    let err = store
        .profiles()
        .create(&NewProfile::new(id, Role::Teacher))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }), "got {err:?}");

    let err = store
        .profiles()
        .create(&NewProfile::new(Uuid::new_v4(), Role::Teacher).with_email("p@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }), "got {err:?}");
}

#[tokio::test]
async fn unknown_role_text_is_rejected_by_schema() {
    let store = store().await;
    let err = sqlx::query("INSERT INTO profiles (user_id, role) VALUES (?, 'admin')")
        .bind(Uuid::new_v4().to_string())
        .execute(store.pool())
        .await
        .map_err(StoreError::from)
        .unwrap_err();
    assert!(matches!(err, StoreError::Check { .. }), "got {err:?}");
}

#[tokio::test]
async fn by_role_filters() {
    let store = store().await;
    profile(&store, Role::Student).await;
    profile(&store, Role::Student).await;
    profile(&store, Role::Teacher).await;

    assert_eq!(store.profiles().by_role(Role::Student).await.unwrap().len(), 2);
    assert_eq!(store.profiles().by_role(Role::Teacher).await.unwrap().len(), 1);
    assert!(store.profiles().by_role(Role::Parent).await.unwrap().is_empty());
}

#[tokio::test]
async fn partial_update_keeps_other_columns() {
    let store = store().await;
    let id = Uuid::new_v4();
    store
        .profiles()
        .create(&NewProfile::new(id, Role::Parent).with_name(Some("Grace".into()), None))
        .await
        .unwrap();

    let update = ProfileUpdate {
        last_name: Some(Some("Hopper".into())),
        ..Default::default()
    };
    let updated = store.profiles().update(id, &update).await.unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Grace"));
    assert_eq!(updated.last_name.as_deref(), Some("Hopper"));

    let clear = ProfileUpdate {
        first_name: Some(None),
        ..Default::default()
    };
    let updated = store.profiles().update(id, &clear).await.unwrap();
    assert_eq!(updated.first_name, None);

    let err = store
        .profiles()
        .update(Uuid::new_v4(), &update)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn student_row_round_trip() {
    let store = store().await;
    let id = profile(&store, Role::Student).await;

    let mut student = StudentProfile::new(id);
    student.graduation_year = Some(2027);
    student.gpa = Some(3.85);
    student.sat_score = Some(1480);
    student.target_countries = Some(vec!["US".into(), "GB".into()]);

    let created = store.students().create(&student).await.unwrap();
    assert_eq!(created, student);

    let update = StudentProfileUpdate {
        act_score: Some(Some(33)),
        target_countries: Some(None),
        ..Default::default()
    };
    let updated = store.students().update(id, &update).await.unwrap();
    assert_eq!(updated.act_score, Some(33));
    assert_eq!(updated.target_countries, None);
    assert_eq!(updated.gpa, Some(3.85));

    let class_of_2027 = store.students().by_graduation_year(2027).await.unwrap();
    assert_eq!(class_of_2027.len(), 1);
    assert!(store.students().by_graduation_year(2030).await.unwrap().is_empty());
}

#[tokio::test]
async fn student_score_ranges_are_enforced_by_schema() {
    let store = store().await;
    let id = profile(&store, Role::Student).await;

    let err = sqlx::query("INSERT INTO student_profile (user_id, sat_score) VALUES (?, 2000)")
        .bind(id.to_string())
        .execute(store.pool())
        .await
        .map_err(StoreError::from)
        .unwrap_err();
    assert!(matches!(err, StoreError::Check { .. }), "got {err:?}");

    let mut student = StudentProfile::new(id);
    student.act_score = Some(0);
    let err = store.students().create(&student).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn gpa_is_stored_at_two_decimal_places_or_rejected() {
    let store = store().await;
    let id = profile(&store, Role::Student).await;

    for gpa in [3.456, f64::NAN] {
        let mut student = StudentProfile::new(id);
        student.gpa = Some(gpa);
        let err = store.students().create(&student).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
    }
    assert!(store.students().find(id).await.unwrap().is_none());

    let mut student = StudentProfile::new(id);
    student.gpa = Some(3.5);
    store.students().create(&student).await.unwrap();

    let update = StudentProfileUpdate {
        gpa: Some(Some(f64::NAN)),
        ..Default::default()
    };
    let err = store.students().update(id, &update).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.students().get(id).await.unwrap().gpa, Some(3.5));
}

#[tokio::test]
async fn specialization_for_missing_profile_is_foreign_key_error() {
    let store = store().await;
    let err = store
        .students()
        .create(&StudentProfile::new(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ForeignKey { .. }), "got {err:?}");
}

#[tokio::test]
async fn specialization_role_is_not_enforced() {
    let store = store().await;
    let parent = profile(&store, Role::Parent).await;

    // Stored with a warning; the schema has no role check here.
    let stored = store.students().create(&StudentProfile::new(parent)).await;
    assert!(stored.is_ok());

    // The role-tagged view follows profiles.role and ignores the stray row.
    let view = store.profiles().get_role_profile(parent).await.unwrap();
    assert!(matches!(view, RoleProfile::Parent { .. }));
}

#[tokio::test]
async fn teacher_row_defaults_and_subject_lookup() {
    let store = store().await;
    let id = profile(&store, Role::Teacher).await;
    let other = profile(&store, Role::Teacher).await;

    let mut teacher = NewTeacherProfile::new(id);
    teacher.subjects = Some(vec!["Mathematics".into(), "Physics".into()]);
    teacher.organization = Some("Lincoln High".into());
    let created = store.teachers().create(&teacher).await.unwrap();
    assert_eq!(created.max_advisees, 50);

    let mut other_teacher = NewTeacherProfile::new(other);
    other_teacher.subjects = Some(vec!["History".into()]);
    store.teachers().create(&other_teacher).await.unwrap();

    let physics = store.teachers().by_subject("Physics").await.unwrap();
    assert_eq!(physics.len(), 1);
    assert_eq!(physics[0].user_id, id);
    assert!(store.teachers().by_subject("Chemistry").await.unwrap().is_empty());

    let update = TeacherProfileUpdate {
        max_advisees: Some(10),
        bio: Some(Some("Counsels seniors".into())),
        ..Default::default()
    };
    let updated = store.teachers().update(id, &update).await.unwrap();
    assert_eq!(updated.max_advisees, 10);
    assert_eq!(updated.organization.as_deref(), Some("Lincoln High"));
}

#[tokio::test]
async fn role_profile_carries_details() {
    let store = store().await;
    let student = profile(&store, Role::Student).await;
    let teacher = profile(&store, Role::Teacher).await;

    let view = store.profiles().get_role_profile(student).await.unwrap();
    assert!(matches!(view, RoleProfile::Student { details: None, .. }));

    store
        .students()
        .create(&StudentProfile::new(student))
        .await
        .unwrap();
    let view = store.profiles().get_role_profile(student).await.unwrap();
    assert_eq!(view.role(), Role::Student);
    assert!(view.student_details().is_some());

    store
        .teachers()
        .create(&NewTeacherProfile::new(teacher))
        .await
        .unwrap();
    let view = store.profiles().get_role_profile(teacher).await.unwrap();
    assert_eq!(view.teacher_details().map(|t| t.max_advisees), Some(50));

    assert!(store
        .profiles()
        .get_role_profile(Uuid::new_v4())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn deleting_profile_cascades_to_specialization() {
    let store = store().await;
    let student = profile(&store, Role::Student).await;
    let teacher = profile(&store, Role::Teacher).await;
    store
        .students()
        .create(&StudentProfile::new(student))
        .await
        .unwrap();
    store
        .teachers()
        .create(&NewTeacherProfile::new(teacher))
        .await
        .unwrap();

    store.profiles().delete(student).await.unwrap();
    store.profiles().delete(teacher).await.unwrap();

    assert!(store.students().find(student).await.unwrap().is_none());
    assert!(store.teachers().find(teacher).await.unwrap().is_none());
    assert!(store.profiles().delete(student).await.unwrap_err().is_not_found());
}
