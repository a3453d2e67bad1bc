#[cfg(test)]
mod tests {
    use crate::commands::appointment::{
        create_appointment_internal, update_appointment_internal,
        update_appointment_status_internal, AppointmentInput,
    };
    use crate::commands::gallery::{add_photo_internal, delete_album_internal, PhotoInput};
    use crate::db::{self, DbPool};

    async fn setup_test_db() -> DbPool {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        db::init_pool(&database_url)
            .await
            .expect("Failed to create pool")
    }

    async fn create_test_client(pool: &DbPool, name: &str) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO clients (name, phone, total_revenue) VALUES ($1, '11 99999-0000', 0) RETURNING id",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to create test client")
    }

    fn booking_input(
        date: &str,
        slot: &str,
        client_id: Option<i32>,
        total: i64,
        deposit: i64,
    ) -> AppointmentInput {
        AppointmentInput {
            id: None,
            booking_date: date.to_string(),
            time_slot: slot.to_string(),
            client_id,
            service_label: "Festa de teste".to_string(),
            status: None,
            total_value: total,
            deposit_value: deposit,
            notes: None,
        }
    }

    async fn cleanup_booking(pool: &DbPool, booking_id: i32, client_id: i32) {
        let _ = sqlx::query("DELETE FROM financial WHERE booking_id = $1")
            .bind(booking_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(booking_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(pool)
            .await;
    }

    #[tokio::test]
    async fn test_deposit_posts_exactly_one_ledger_entry() {
        let pool = setup_test_db().await;
        let client_id = create_test_client(&pool, "Cliente Sinal Teste").await;

        let booking_id =
            create_appointment_internal(&pool, booking_input("2099-01-11", "14:00", Some(client_id), 500, 150))
                .await
                .expect("create booking failed");

        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            "SELECT amount, kind, category, posting_reason FROM financial WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(rows.len(), 1, "expected exactly one posted entry");
        assert_eq!(rows[0].0, 150);
        assert_eq!(rows[0].1, "income");
        assert_eq!(rows[0].2, "Reserva");
        assert_eq!(rows[0].3, "deposit");

        let revenue: i64 = sqlx::query_scalar("SELECT total_revenue FROM clients WHERE id = $1")
            .bind(client_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(revenue, 150);

        cleanup_booking(&pool, booking_id, client_id).await;
    }

    #[tokio::test]
    async fn test_zero_deposit_posts_nothing() {
        let pool = setup_test_db().await;
        let client_id = create_test_client(&pool, "Cliente Sem Sinal").await;

        let booking_id =
            create_appointment_internal(&pool, booking_input("2099-01-12", "10:00", Some(client_id), 500, 0))
                .await
                .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financial WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        cleanup_booking(&pool, booking_id, client_id).await;
    }

    #[tokio::test]
    async fn test_mark_paid_posts_remaining_once() {
        let pool = setup_test_db().await;
        let client_id = create_test_client(&pool, "Cliente Pagamento Final").await;

        let booking_id =
            create_appointment_internal(&pool, booking_input("2099-01-13", "16:00", Some(client_id), 450, 150))
                .await
                .unwrap();

        update_appointment_status_internal(&pool, booking_id, "paid".to_string())
            .await
            .expect("mark paid failed");

        let (status, payment_at): (String, Option<chrono::NaiveDateTime>) =
            sqlx::query_as("SELECT status, payment_at FROM appointments WHERE id = $1")
                .bind(booking_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "paid");
        assert!(payment_at.is_some());

        let finals: Vec<(i64, String)> = sqlx::query_as(
            "SELECT amount, category FROM financial WHERE booking_id = $1 AND posting_reason = 'final-payment'",
        )
        .bind(booking_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].0, 300);
        assert_eq!(finals[0].1, "Evento");

        // A second mark-paid must not post a second entry.
        update_appointment_status_internal(&pool, booking_id, "paid".to_string())
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM financial WHERE booking_id = $1 AND posting_reason = 'final-payment'",
        )
        .bind(booking_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);

        cleanup_booking(&pool, booking_id, client_id).await;
    }

    #[tokio::test]
    async fn test_slot_conflict_and_cancel_frees_slot() {
        let pool = setup_test_db().await;
        let client_id = create_test_client(&pool, "Cliente Conflito").await;

        let first =
            create_appointment_internal(&pool, booking_input("2099-01-14", "19:00", Some(client_id), 0, 0))
                .await
                .unwrap();

        let conflict =
            create_appointment_internal(&pool, booking_input("2099-01-14", "19:00", Some(client_id), 0, 0))
                .await;
        assert!(conflict.is_err(), "same slot must be rejected");

        update_appointment_status_internal(&pool, first, "cancelled".to_string())
            .await
            .unwrap();

        let second =
            create_appointment_internal(&pool, booking_input("2099-01-14", "19:00", Some(client_id), 0, 0))
                .await
                .expect("cancelled booking must free its slot");

        let _ = sqlx::query("DELETE FROM appointments WHERE id IN ($1, $2)")
            .bind(first)
            .bind(second)
            .execute(&pool)
            .await;
        let _ = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&pool)
            .await;
    }

    #[tokio::test]
    async fn test_remaining_value_recomputed_on_edit() {
        let pool = setup_test_db().await;
        let client_id = create_test_client(&pool, "Cliente Saldo").await;

        let booking_id =
            create_appointment_internal(&pool, booking_input("2099-01-15", "09:30", Some(client_id), 1000, 400))
                .await
                .unwrap();

        let remaining: i64 = sqlx::query_scalar(
            "SELECT total_value - deposit_value FROM appointments WHERE id = $1",
        )
        .bind(booking_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(remaining, 600);

        let mut edit = booking_input("2099-01-15", "09:30", Some(client_id), 1200, 400);
        edit.id = Some(booking_id);
        update_appointment_internal(&pool, edit).await.unwrap();

        let remaining: i64 = sqlx::query_scalar(
            "SELECT total_value - deposit_value FROM appointments WHERE id = $1",
        )
        .bind(booking_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(remaining, 800);

        cleanup_booking(&pool, booking_id, client_id).await;
    }

    #[tokio::test]
    async fn test_album_delete_cascades_only_its_photos() {
        let pool = setup_test_db().await;

        let album_a: i32 =
            sqlx::query_scalar("INSERT INTO albums (title) VALUES ('Cascade A') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();
        let album_b: i32 =
            sqlx::query_scalar("INSERT INTO albums (title) VALUES ('Cascade B') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();

        for url in ["https://img.test/a1.jpg", "https://img.test/a2.jpg"] {
            add_photo_internal(
                &pool,
                PhotoInput {
                    album_id: album_a,
                    url: url.to_string(),
                    caption: None,
                },
            )
            .await
            .unwrap();
        }
        add_photo_internal(
            &pool,
            PhotoInput {
                album_id: album_b,
                url: "https://img.test/b1.jpg".to_string(),
                caption: None,
            },
        )
        .await
        .unwrap();

        let (count_a, cover_a): (i32, Option<String>) =
            sqlx::query_as("SELECT photo_count, cover_url FROM albums WHERE id = $1")
                .bind(album_a)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count_a, 2);
        assert_eq!(cover_a.as_deref(), Some("https://img.test/a1.jpg"));

        delete_album_internal(&pool, album_a).await.unwrap();

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE album_id = $1")
            .bind(album_a)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);

        let survivors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE album_id = $1")
            .bind(album_b)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(survivors, 1, "other albums keep their photos");

        delete_album_internal(&pool, album_b).await.unwrap();
    }
}
