use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use movie_store::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "demo", "demo12345").await?;
    seed_movies(&pool).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, username: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // Already seeded on a previous run.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Seeded user {username}");
    Ok(user_id)
}

async fn seed_movies(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let movies: [(&str, i64, &str); 6] = [
        ("Avatar", 13, "A marine on an alien planet."),
        ("Titanic", 11, "An ill-fated voyage."),
        ("Inception", 12, "A thief who steals secrets in dreams."),
        ("Heat", 10, "A crew of professional bank robbers."),
        ("Alien", 9, "The crew of a commercial spacecraft."),
        ("Amelie", 8, "A shy waitress in Paris."),
    ];

    for (name, price, description) in movies {
        let image = format!("movie_images/{}.jpg", name.to_lowercase());
        sqlx::query(
            r#"
            INSERT INTO movies (name, price, description, image)
            SELECT $1, $2, $3, $4
            WHERE NOT EXISTS (SELECT 1 FROM movies WHERE name = $1)
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(description)
        .bind(image)
        .execute(pool)
        .await?;
    }

    println!("Seeded movies");
    Ok(())
}
