use std::sync::Arc;
use transfer_sim::application::engine::TransferEngine;
use transfer_sim::domain::account::Account;
use transfer_sim::domain::ports::{SharedTransferService, TransferServiceBox};

#[tokio::test]
async fn test_service_as_boxed_trait_object() {
    let service: TransferServiceBox = Box::new(TransferEngine::default());
    let from = Account::new("A1", 100);
    let to = Account::new("A2", 0);

    assert!(service.transfer(&from, &to, 40).await);
    assert_eq!(from.balance().await, 60);
    assert_eq!(to.balance().await, 40);
}

#[tokio::test]
async fn test_shared_service_across_tasks() {
    let service: SharedTransferService = Arc::new(TransferEngine::default());
    let accounts = Arc::new((Account::new("A1", 100), Account::new("A2", 100)));

    // Verify Send + Sync by spawning tasks
    let forward = {
        let service = Arc::clone(&service);
        let accounts = Arc::clone(&accounts);
        tokio::spawn(async move { service.transfer(&accounts.0, &accounts.1, 30).await })
    };
    let backward = {
        let service = Arc::clone(&service);
        let accounts = Arc::clone(&accounts);
        tokio::spawn(async move { service.transfer(&accounts.1, &accounts.0, 10).await })
    };

    assert!(forward.await.unwrap());
    assert!(backward.await.unwrap());
    assert_eq!(accounts.0.balance().await, 80);
    assert_eq!(accounts.1.balance().await, 120);
}
