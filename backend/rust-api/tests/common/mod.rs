use axum::Router;
use mongodb::bson::{doc, Document};
use skillbridge_api::middlewares::auth::{JwtClaims, JwtService};
use skillbridge_api::{config::Config, create_router, services::AppState};
use std::sync::Arc;

pub async fn create_test_app() -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // Load test environment from .env.test
    dotenvy::from_filename(".env.test").ok();

    // Load test configuration
    let config = Config::load().expect("Failed to load test configuration");

    eprintln!("Test config loaded - Redis URI: {}", config.redis_uri);

    // Connect to test databases
    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to connect to test MongoDB");

    eprintln!("MongoDB connected");

    let redis_client =
        redis::Client::open(config.redis_uri.clone()).expect("Failed to create test Redis client");

    eprintln!("Redis client created, attempting connection...");

    // Create app state (connection is established inside)
    let app_state = Arc::new(
        AppState::new(config.clone(), mongo_client.clone(), redis_client)
            .await
            .expect("Failed to initialize test app state"),
    );

    eprintln!("AppState initialized successfully");

    // Seed test data
    seed_test_data(&mongo_client, &config.mongo_database).await;

    // Build test router (same as main app)
    create_router(app_state)
}

/// Mint a bearer token the way the mobile clients would carry one. The
/// signing secret comes from the same test configuration the app loads.
pub fn bearer_token(user_id: &str) -> String {
    dotenvy::from_filename(".env.test").ok();
    let config = Config::load().expect("Failed to load test configuration");

    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        iat: chrono::Utc::now().timestamp() as usize,
    };

    JwtService::new(&config.jwt_secret)
        .generate_token(claims)
        .expect("Failed to mint test token")
}

/// Fetch the raw progress document for one (user, lesson) pair, or None if
/// no submission has been recorded yet.
pub async fn find_progress(user_id: &str, lesson_id: &str) -> Option<Document> {
    dotenvy::from_filename(".env.test").ok();
    let config = Config::load().expect("Failed to load test configuration");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to connect to test MongoDB");

    mongo_client
        .database(&config.mongo_database)
        .collection::<Document>("progress")
        .find_one(doc! { "_id": format!("{}_{}", user_id, lesson_id) })
        .await
        .expect("Failed to query progress collection")
}

async fn seed_test_data(mongo_client: &mongodb::Client, db_name: &str) {
    let db = mongo_client.database(db_name);

    seed_document(
        &db.collection("topics"),
        doc! {
            "_id": "topic-basics",
            "name": "Money Basics",
            "description": "Foundations of everyday money management",
            "sortOrder": 1
        },
    )
    .await;

    seed_document(
        &db.collection("topics"),
        doc! {
            "_id": "topic-saving",
            "name": "Saving",
            "description": "Building a savings habit",
            "sortOrder": 2
        },
    )
    .await;

    seed_document(
        &db.collection("lessons"),
        doc! {
            "_id": "lesson-budgeting",
            "topicId": "topic-basics",
            "title": "Budgeting Basics",
            "xp": 50,
            "difficulty": "easy",
            "estimatedMinutes": 5,
            "order": 1,
            "content": [
                {"type": "paragraph", "text": "A budget splits income into needs, wants and savings."},
                {"type": "paragraph", "text": "Track spending for a month before setting limits."},
                {"type": "paragraph", "text": "Review the plan whenever income changes."}
            ],
            "assessment": {
                "passingScore": 70,
                "questions": [
                    {
                        "id": "q1",
                        "questionText": "What does a budget split?",
                        "options": [
                            {"id": "a", "text": "Income"},
                            {"id": "b", "text": "Furniture"}
                        ],
                        "correctAnswerId": "a",
                        "xp": 10
                    },
                    {
                        "id": "q2",
                        "questionText": "When should limits be set?",
                        "options": [
                            {"id": "a", "text": "Immediately"},
                            {"id": "b", "text": "After tracking spending"}
                        ],
                        "correctAnswerId": "b",
                        "xp": 10
                    },
                    {
                        "id": "q3",
                        "questionText": "When does a budget need a review?",
                        "options": [
                            {"id": "a", "text": "Never"},
                            {"id": "b", "text": "Every decade"},
                            {"id": "c", "text": "Whenever income changes"}
                        ],
                        "correctAnswerId": "c",
                        "xp": 20
                    }
                ]
            },
            "nextLessonId": "lesson-saving-101"
        },
    )
    .await;

    seed_document(
        &db.collection("lessons"),
        doc! {
            "_id": "lesson-saving-101",
            "topicId": "topic-basics",
            "title": "Saving 101",
            "xp": 40,
            "difficulty": "easy",
            "estimatedMinutes": 4,
            "order": 2,
            "content": [
                {"type": "paragraph", "text": "Pay yourself first: move savings aside on payday."}
            ],
            "assessment": {
                "passingScore": 70,
                "questions": [
                    {
                        "id": "q1",
                        "questionText": "When should savings move aside?",
                        "options": [
                            {"id": "a", "text": "On payday"},
                            {"id": "b", "text": "Whatever is left at month end"}
                        ],
                        "correctAnswerId": "a",
                        "xp": 10
                    }
                ]
            }
        },
    )
    .await;

    seed_document(
        &db.collection("lessons"),
        doc! {
            "_id": "lesson-threshold",
            "topicId": "topic-saving",
            "title": "Threshold Drill",
            "xp": 100,
            "difficulty": "medium",
            "estimatedMinutes": 8,
            "order": 1,
            "content": [
                {"type": "paragraph", "text": "A drill lesson for exercising the passing boundary."}
            ],
            "assessment": {
                "passingScore": 70,
                "questions": [
                    {
                        "id": "big",
                        "questionText": "Worth most of the grade",
                        "options": [
                            {"id": "a", "text": "Right"},
                            {"id": "b", "text": "Wrong"}
                        ],
                        "correctAnswerId": "a",
                        "xp": 70
                    },
                    {
                        "id": "small",
                        "questionText": "Worth the rest",
                        "options": [
                            {"id": "a", "text": "Right"},
                            {"id": "b", "text": "Wrong"}
                        ],
                        "correctAnswerId": "a",
                        "xp": 30
                    }
                ]
            }
        },
    )
    .await;

    seed_document(
        &db.collection("quizzes"),
        doc! {
            "_id": "test-quiz",
            "lessonId": "lesson-budgeting",
            "questions": [
                {
                    "id": "q1",
                    "questionText": "What does a budget split?",
                    "options": [
                        {"id": "a", "text": "Income"},
                        {"id": "b", "text": "Furniture"}
                    ],
                    "correctAnswerId": "a",
                    "xp": 10
                },
                {
                    "id": "q2",
                    "questionText": "When should limits be set?",
                    "options": [
                        {"id": "a", "text": "Immediately"},
                        {"id": "b", "text": "After tracking spending"}
                    ],
                    "correctAnswerId": "b",
                    "xp": 10
                },
                {
                    "id": "q3",
                    "questionText": "When does a budget need a review?",
                    "options": [
                        {"id": "a", "text": "Never"},
                        {"id": "b", "text": "Every decade"},
                        {"id": "c", "text": "Whenever income changes"}
                    ],
                    "correctAnswerId": "c",
                    "xp": 20
                }
            ]
        },
    )
    .await;
}

async fn seed_document(collection: &mongodb::Collection<Document>, document: Document) {
    let id = document
        .get_str("_id")
        .expect("seed document needs an _id")
        .to_string();

    let exists = collection.find_one(doc! { "_id": &id }).await.unwrap();
    if exists.is_some() {
        return;
    }

    // Try to insert, ignore duplicate key error (race condition with parallel tests)
    match collection.insert_one(document).await {
        Ok(_) => eprintln!("Seeded test document {}", id),
        Err(e) => {
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref we,
            )) = *e.kind
            {
                if we.code == 11000 {
                    eprintln!("Test document {} already exists (inserted by parallel test)", id);
                    return;
                }
            }
            panic!("Failed to seed test document {}: {:?}", id, e);
        }
    }
}
