//! Demo data for local development: three users sharing one tag catalog,
//! each with a few recurring templates and a batch of random todos.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::db::enums::{RecurringFrequency, TodoPriority};
use crate::db::services::{recurring_todo_service, tag_service, todo_service, user_service};
use crate::error::ServiceResult;
use crate::services::auth_service;
use crate::web::models::RegisterRequest;
use crate::web::models::recurring_todo_models::CreateRecurringTodo;
use crate::web::models::todo_models::CreateTodo;

pub const DEMO_PASSWORD: &str = "test";
pub const DEMO_USERS: [&str; 3] = ["test@test.fr", "user2@test.fr", "user3@test.fr"];

const DEMO_TAGS: [(&str, &str); 8] = [
    ("Personnel", "#FF0000"),
    ("Travail", "#00FF00"),
    ("Urgent", "#FF6B6B"),
    ("Important", "#4ECDC4"),
    ("Shopping", "#45B7D1"),
    ("Santé", "#96CEB4"),
    ("Loisirs", "#FFEEAD"),
    ("Famille", "#D4A5A5"),
];

const DEMO_TEMPLATES: [(&str, &str, RecurringFrequency); 3] = [
    ("Réunion d'équipe", "Réunion hebdomadaire avec l'équipe", RecurringFrequency::Weekly),
    ("Payer les factures", "Vérifier et payer les factures mensuelles", RecurringFrequency::Monthly),
    ("Exercice physique", "30 minutes de sport", RecurringFrequency::Daily),
];

const TODO_TITLES: [&str; 18] = [
    "Faire les courses",
    "Appeler le médecin",
    "Préparer la présentation",
    "Réviser le rapport",
    "Nettoyer la maison",
    "Répondre aux emails",
    "Faire une sauvegarde",
    "Organiser les fichiers",
    "Planifier les vacances",
    "Acheter un cadeau",
    "Réparer le vélo",
    "Lire un livre",
    "Apprendre Rust",
    "Méditer",
    "Faire du yoga",
    "Jardiner",
    "Cuisiner",
    "Ranger le garage",
];

const TODOS_PER_USER: usize = 20;
const PRIORITIES: [TodoPriority; 3] = [TodoPriority::Low, TodoPriority::Medium, TodoPriority::High];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub tags: usize,
    pub recurring_todos: usize,
    pub todos: usize,
}

/// Seeds the demo data unless the first demo user already exists.
pub async fn seed_database(db: &DatabaseConnection, bcrypt_cost: u32) -> ServiceResult<Option<SeedReport>> {
    let mut rng = StdRng::from_os_rng();
    seed_database_with(db, bcrypt_cost, &mut rng).await
}

pub async fn seed_database_with<R: Rng + Send>(
    db: &DatabaseConnection,
    bcrypt_cost: u32,
    rng: &mut R,
) -> ServiceResult<Option<SeedReport>> {
    if user_service::get_user_by_email(db, DEMO_USERS[0]).await?.is_some() {
        info!("Demo data already present, skipping seed.");
        return Ok(None);
    }

    let mut report = SeedReport::default();

    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for email in DEMO_USERS {
        let request = RegisterRequest {
            email: email.to_string(),
            password: DEMO_PASSWORD.to_string(),
        };
        users.push(auth_service::register_user(db, request, bcrypt_cost).await?);
    }
    report.users = users.len();

    let mut tag_ids = Vec::with_capacity(DEMO_TAGS.len());
    for (name, color) in DEMO_TAGS {
        tag_ids.push(tag_service::create_tag(db, name, color).await?.id);
    }
    report.tags = tag_ids.len();

    for user in &users {
        for (title, description, frequency) in DEMO_TEMPLATES {
            let payload = CreateRecurringTodo {
                title: title.to_string(),
                description: Some(description.to_string()),
                frequency,
                active: true,
                tag_ids: Some(random_tags(rng, &tag_ids)),
            };
            recurring_todo_service::create_recurring_todo(db, user.id, payload).await?;
            report.recurring_todos += 1;
        }

        for _ in 0..TODOS_PER_USER {
            let title = TODO_TITLES.choose(rng).copied().unwrap_or(TODO_TITLES[0]);
            let priority = PRIORITIES.choose(rng).copied().unwrap_or_default();
            let payload = CreateTodo {
                title: title.to_string(),
                description: Some(format!("Description de la tâche {}", rng.random_range(1..=1000))),
                completed: rng.random_bool(0.5),
                due_date: Some(Utc::now() + Duration::days(rng.random_range(-5..=30))),
                priority,
                tag_ids: Some(random_tags(rng, &tag_ids)),
            };
            todo_service::create_todo(db, user.id, payload).await?;
            report.todos += 1;
        }
    }

    info!(
        users = report.users,
        tags = report.tags,
        recurring_todos = report.recurring_todos,
        todos = report.todos,
        "Demo data seeded."
    );
    Ok(Some(report))
}

/// One to three distinct tags.
fn random_tags<R: Rng>(rng: &mut R, tag_ids: &[i32]) -> Vec<i32> {
    let count = rng.random_range(1..=3);
    tag_ids.choose_multiple(rng, count).copied().collect()
}
