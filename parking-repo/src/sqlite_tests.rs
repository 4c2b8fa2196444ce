//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use parking_types::{
        ParkingRepository, ParkingUnitOfWork, RepoError, Ticket, TicketId, TicketRepository,
        TicketStatus, Vehicle, VehicleId, VehicleRepository,
    };
    use rust_decimal_macros::dec;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    async fn seed_vehicle(repo: &SqliteRepo, plate: &str) -> Vehicle {
        let mut uow = repo.begin().await.unwrap();
        let vehicle = uow
            .upsert_vehicle(Vehicle::new(plate, "Onix", "Silver").unwrap())
            .await
            .unwrap();
        uow.commit().await.unwrap();
        vehicle
    }

    #[tokio::test]
    async fn test_upsert_vehicle_creates_then_reuses() {
        let repo = setup_repo().await;

        let first = seed_vehicle(&repo, "ABC1D23").await;

        let mut uow = repo.begin().await.unwrap();
        let second = uow
            .upsert_vehicle(Vehicle::new("ABC1D23", "Corolla", "Red").unwrap())
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.model, "Onix");
        assert_eq!(second.color, "Silver");
    }

    #[tokio::test]
    async fn test_find_vehicle_by_plate_not_found() {
        let repo = setup_repo().await;

        let mut uow = repo.begin().await.unwrap();
        let result = uow.find_vehicle_by_plate("NOPE000").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_vehicle_updates_descriptive_fields() {
        let repo = setup_repo().await;
        let mut vehicle = seed_vehicle(&repo, "ABC1D23").await;

        vehicle.color = "Blue".to_string();
        let mut uow = repo.begin().await.unwrap();
        uow.save_vehicle(vehicle.clone()).await.unwrap();
        let fetched = uow.find_vehicle_by_plate("ABC1D23").await.unwrap().unwrap();
        uow.commit().await.unwrap();

        assert_eq!(fetched.id, vehicle.id);
        assert_eq!(fetched.color, "Blue");
    }

    #[tokio::test]
    async fn test_save_and_find_ticket() {
        let repo = setup_repo().await;
        let vehicle = seed_vehicle(&repo, "ABC1D23").await;
        let entry = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();

        let mut uow = repo.begin().await.unwrap();
        let ticket = Ticket::open(vehicle.id, "A-01", entry).unwrap();
        uow.save_ticket(ticket.clone()).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = repo.begin().await.unwrap();
        let fetched = uow.find_ticket_by_id(ticket.id).await.unwrap().unwrap();

        assert_eq!(fetched, ticket);
    }

    #[tokio::test]
    async fn test_find_ticket_not_found() {
        let repo = setup_repo().await;

        let mut uow = repo.begin().await.unwrap();
        let result = uow.find_ticket_by_id(TicketId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_closing_ticket_persists_exit_and_fee() {
        let repo = setup_repo().await;
        let vehicle = seed_vehicle(&repo, "ABC1D23").await;
        let entry = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();

        let mut uow = repo.begin().await.unwrap();
        let mut ticket = uow
            .save_ticket(Ticket::open(vehicle.id, "A-01", entry).unwrap())
            .await
            .unwrap();
        ticket.close(entry + Duration::minutes(31), dec!(8.00)).unwrap();
        uow.save_ticket(ticket.clone()).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = repo.begin().await.unwrap();
        let fetched = uow.find_ticket_by_id(ticket.id).await.unwrap().unwrap();

        assert_eq!(fetched.status, TicketStatus::Closed);
        assert_eq!(fetched.fee, Some(dec!(8.00)));
        assert_eq!(fetched.exit_at, Some(entry + Duration::minutes(31)));
        assert!(!uow.exists_open_ticket_for_slot("A-01").await.unwrap());
        assert!(!uow.exists_open_ticket_for_vehicle(vehicle.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_occupancy_queries() {
        let repo = setup_repo().await;
        let alice = seed_vehicle(&repo, "AAA1111").await;
        let bob = seed_vehicle(&repo, "BBB2222").await;

        let mut uow = repo.begin().await.unwrap();
        uow.save_ticket(Ticket::open(alice.id, "A-01", Utc::now()).unwrap())
            .await
            .unwrap();
        uow.save_ticket(Ticket::open(bob.id, "A-02", Utc::now()).unwrap())
            .await
            .unwrap();

        assert!(uow.exists_open_ticket_for_vehicle(alice.id).await.unwrap());
        assert!(!uow.exists_open_ticket_for_vehicle(VehicleId::new()).await.unwrap());
        assert!(uow.exists_open_ticket_for_slot("A-02").await.unwrap());
        assert!(!uow.exists_open_ticket_for_slot("Z-99").await.unwrap());
        assert_eq!(uow.count_by_status(TicketStatus::Open).await.unwrap(), 2);
        assert_eq!(uow.count_by_status(TicketStatus::Closed).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_tickets_by_status_ordered_by_entry() {
        let repo = setup_repo().await;
        let alice = seed_vehicle(&repo, "AAA1111").await;
        let bob = seed_vehicle(&repo, "BBB2222").await;
        let early = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();

        let mut uow = repo.begin().await.unwrap();
        uow.save_ticket(Ticket::open(bob.id, "A-02", late).unwrap())
            .await
            .unwrap();
        uow.save_ticket(Ticket::open(alice.id, "A-01", early).unwrap())
            .await
            .unwrap();

        let open = uow.find_tickets_by_status(TicketStatus::Open).await.unwrap();

        assert_eq!(open.len(), 2);
        assert_eq!(open[0].vehicle_id, alice.id);
        assert_eq!(open[1].vehicle_id, bob.id);
        assert!(
            uow.find_tickets_by_status(TicketStatus::Closed)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let repo = setup_repo().await;

        {
            let mut uow = repo.begin().await.unwrap();
            let vehicle = uow
                .upsert_vehicle(Vehicle::new("ABC1D23", "Onix", "Silver").unwrap())
                .await
                .unwrap();
            uow.save_ticket(Ticket::open(vehicle.id, "A-01", Utc::now()).unwrap())
                .await
                .unwrap();
        }

        let mut uow = repo.begin().await.unwrap();
        assert!(uow.find_vehicle_by_plate("ABC1D23").await.unwrap().is_none());
        assert_eq!(uow.count_by_status(TicketStatus::Open).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_second_open_ticket_for_slot_is_conflict() {
        let repo = setup_repo().await;
        let alice = seed_vehicle(&repo, "AAA1111").await;
        let bob = seed_vehicle(&repo, "BBB2222").await;

        let mut uow = repo.begin().await.unwrap();
        uow.save_ticket(Ticket::open(alice.id, "A-01", Utc::now()).unwrap())
            .await
            .unwrap();
        let result = uow
            .save_ticket(Ticket::open(bob.id, "A-01", Utc::now()).unwrap())
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_second_open_ticket_for_vehicle_is_conflict() {
        let repo = setup_repo().await;
        let alice = seed_vehicle(&repo, "AAA1111").await;

        let mut uow = repo.begin().await.unwrap();
        uow.save_ticket(Ticket::open(alice.id, "A-01", Utc::now()).unwrap())
            .await
            .unwrap();
        let result = uow
            .save_ticket(Ticket::open(alice.id, "A-02", Utc::now()).unwrap())
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_use_after_commit_fails() {
        let repo = setup_repo().await;

        let mut uow = repo.begin().await.unwrap();
        uow.commit().await.unwrap();

        assert!(matches!(
            uow.count_by_status(TicketStatus::Open).await,
            Err(RepoError::Transaction(_))
        ));
        assert!(matches!(uow.commit().await, Err(RepoError::Transaction(_))));
    }

    #[tokio::test]
    async fn test_on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/data/parking.db?mode=rwc", dir.path().display());

        {
            let repo = SqliteRepo::new(&url).await.unwrap();
            seed_vehicle(&repo, "ABC1D23").await;
            repo.pool().close().await;
        }

        let repo = SqliteRepo::new(&url).await.unwrap();
        let mut uow = repo.begin().await.unwrap();
        assert!(uow.find_vehicle_by_plate("ABC1D23").await.unwrap().is_some());
        drop(uow);
        repo.pool().close().await;
    }
}
