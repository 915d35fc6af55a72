//! Analytics readers running against a live writer
//!
//! Validates:
//! - Reads never observe a torn collection while the service mutates
//! - Aggregated statistics agree with the collections they were computed from
//! - Health checks keep resolving under write load

use std::collections::HashSet;
use std::sync::Arc;

use projboard_analytics::Analytics;
use projboard_core::{ProjectService, Role, TicketStatus};
use tokio::task::JoinSet;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("projboard_core=debug,projboard_analytics=debug")
        .with_test_writer()
        .try_init();
}

const TICKETS: usize = 60;
const READERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_and_writer_interleave() {
    init_tracing();

    let service = Arc::new(ProjectService::new());
    let manager = service
        .register_user("manager", "manager@test.com", "Manager")
        .unwrap();
    let developer = service
        .register_user("developer", "dev@test.com", "Developer")
        .unwrap();
    let project = service
        .create_project("Busy Project", "", manager.id)
        .unwrap();
    service
        .add_team_member(project.id, developer.id, Role::Developer, manager.id)
        .unwrap();

    let writer = {
        let service = service.clone();
        let project_id = project.id;
        tokio::task::spawn_blocking(move || {
            for i in 0..TICKETS {
                let ticket = service
                    .create_ticket(&format!("Task {i}"), "", project_id, None, manager.id)
                    .unwrap();
                if i % 2 == 0 {
                    service
                        .assign_developers_to_ticket(
                            ticket.id,
                            HashSet::from([developer.id]),
                            manager.id,
                        )
                        .unwrap();
                    service
                        .update_ticket_status(ticket.id, TicketStatus::Accepted, manager.id)
                        .unwrap();
                    service
                        .update_ticket_status(ticket.id, TicketStatus::InProgress, developer.id)
                        .unwrap();
                    service
                        .update_ticket_status(ticket.id, TicketStatus::Completed, developer.id)
                        .unwrap();
                }
            }
        })
    };

    let analytics = Analytics::new(service.clone());
    let mut readers = JoinSet::new();
    for _ in 0..READERS {
        let analytics = analytics.clone();
        let project_id = project.id;
        readers.spawn(async move {
            for _ in 0..10 {
                let snapshot = analytics.get_project_analytics(project_id).await.unwrap();
                assert_eq!(snapshot.stats.total_tickets, snapshot.tickets.len());
                assert!(snapshot.stats.completed_tickets <= snapshot.stats.total_tickets);
                assert!(snapshot.tickets.len() <= TICKETS);

                let report = analytics.quick_health_check(project_id).await.unwrap();
                assert!(report.healthy);
                tokio::task::yield_now().await;
            }
        });
    }

    writer.await.unwrap();
    while let Some(joined) = readers.join_next().await {
        joined.unwrap();
    }

    let fin = analytics.get_project_analytics(project.id).await.unwrap();
    assert_eq!(fin.stats.total_tickets, TICKETS);
    assert_eq!(fin.stats.completed_tickets, TICKETS / 2);
    assert_eq!(fin.stats.completion_percentage, 50.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_projects_fan_out() {
    init_tracing();

    let service = Arc::new(ProjectService::new());
    let manager = service
        .register_user("manager", "manager@test.com", "Manager")
        .unwrap();

    let mut ids = Vec::new();
    for p in 0..20 {
        let project = service
            .create_project(&format!("Project {p}"), "", manager.id)
            .unwrap();
        for t in 0..p {
            service
                .create_ticket(&format!("Task {t}"), "", project.id, None, manager.id)
                .unwrap();
        }
        ids.push(project.id);
    }

    let results = Analytics::new(service.clone())
        .get_multiple_projects_analytics(&ids)
        .await
        .unwrap();

    assert_eq!(results.len(), 20);
    for (p, result) in results.iter().enumerate() {
        assert_eq!(result.project.id, ids[p]);
        assert_eq!(result.stats.total_tickets, p);
    }
}
