//! Deterministic demo fixtures.
//!
//! The demo ships with a small Dutch office worth of data. Rows are built
//! from the typed wire structs and fed through the same resolver path as a
//! bulk load, in schema load order, so seeded relations behave exactly like
//! loaded ones.

use chrono::NaiveDate;

use crate::db::{resolver, Database};
use crate::entity::{
    to_row, Customer, Employee, Invoice, InvoiceStatus, Note, Project, ProjectStatus, Role, Task,
    TaskPriority, TaskStatus,
};
use crate::error::Result;
use crate::schema::EntityKind;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    // Fixture dates are compile-time constants and always valid.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn roles() -> Vec<Role> {
    let names = ["Directeur", "Engineer", "Verkoper"];
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Role {
            id: i as u64 + 1,
            name: (*name).to_string(),
            order: i as u64 + 1,
        })
        .collect()
}

fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: 1,
            name: "Bakkerij de Vries".to_string(),
            contact_person: "Willem de Vries".to_string(),
            email: "willem@bakkerijdevries.nl".to_string(),
            order: 1,
        },
        Customer {
            id: 2,
            name: "Jansen Transport".to_string(),
            contact_person: "Karin Jansen".to_string(),
            email: "karin@jansentransport.nl".to_string(),
            order: 2,
        },
        Customer {
            id: 3,
            name: "Hotel Zeezicht".to_string(),
            contact_person: "Olivier Dubois".to_string(),
            email: "olivier@hotelzeezicht.nl".to_string(),
            order: 3,
        },
    ]
}

fn employees() -> Vec<Employee> {
    vec![
        Employee {
            id: 1,
            name: "Anna Bakker".to_string(),
            email: "anna@backoffice.demo".to_string(),
            role_id: Some(2),
            department: "Engineering".to_string(),
            active: true,
            order: 1,
        },
        Employee {
            id: 2,
            name: "Pieter de Jong".to_string(),
            email: "pieter@backoffice.demo".to_string(),
            role_id: Some(3),
            department: "Sales".to_string(),
            active: true,
            order: 2,
        },
        Employee {
            id: 3,
            name: "Sanne Visser".to_string(),
            email: "sanne@backoffice.demo".to_string(),
            role_id: Some(1),
            department: "Management".to_string(),
            active: true,
            order: 3,
        },
        Employee {
            id: 4,
            name: "Tom Mulder".to_string(),
            email: "tom@backoffice.demo".to_string(),
            role_id: Some(2),
            department: "Engineering".to_string(),
            active: false,
            order: 4,
        },
    ]
}

fn projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            name: "Website vernieuwing".to_string(),
            amount: 12500.0,
            status: ProjectStatus::InProgress,
            customer_id: Some(1),
            employee_id: Some(1),
            start_date: date(2025, 1, 15),
            end_date: None,
            order: 1,
        },
        Project {
            id: 2,
            name: "Wagenpark planner".to_string(),
            amount: 8000.0,
            status: ProjectStatus::Pending,
            customer_id: Some(2),
            employee_id: Some(4),
            start_date: date(2025, 3, 1),
            end_date: None,
            order: 2,
        },
        Project {
            id: 3,
            name: "Boekingssysteem".to_string(),
            amount: 21000.0,
            status: ProjectStatus::Completed,
            customer_id: Some(3),
            employee_id: Some(1),
            start_date: date(2024, 9, 1),
            end_date: Some(date(2025, 2, 28)),
            order: 3,
        },
    ]
}

fn invoices() -> Vec<Invoice> {
    vec![
        Invoice {
            id: 1,
            due_date: date(2025, 3, 31),
            amount: 6250.0,
            status: InvoiceStatus::Paid,
            project_id: Some(1),
            order: 1,
        },
        Invoice {
            id: 2,
            due_date: date(2025, 6, 30),
            amount: 6250.0,
            status: InvoiceStatus::Open,
            project_id: Some(1),
            order: 2,
        },
        Invoice {
            id: 3,
            due_date: date(2025, 3, 15),
            amount: 21000.0,
            status: InvoiceStatus::Open,
            project_id: Some(3),
            order: 3,
        },
    ]
}

fn tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            title: "Homepage ontwerp".to_string(),
            description: "Nieuw ontwerp voor de homepage afstemmen met de klant.".to_string(),
            employee_id: Some(1),
            project_id: Some(1),
            status: TaskStatus::InProgress,
            due_date: Some(date(2025, 4, 15)),
            priority: TaskPriority::High,
            order: 1,
        },
        Task {
            id: 2,
            title: "Offerte nabellen".to_string(),
            description: "Jansen Transport bellen over de offerte.".to_string(),
            employee_id: Some(2),
            project_id: Some(2),
            status: TaskStatus::Todo,
            due_date: Some(date(2025, 4, 1)),
            priority: TaskPriority::Normal,
            order: 2,
        },
        Task {
            id: 3,
            title: "Oplevering documenteren".to_string(),
            description: "Documentatie van het boekingssysteem afronden.".to_string(),
            employee_id: Some(1),
            project_id: Some(3),
            status: TaskStatus::Done,
            due_date: None,
            priority: TaskPriority::Low,
            order: 3,
        },
        Task {
            id: 4,
            title: "Servermigratie plannen".to_string(),
            description: "Migratie inplannen met het team.".to_string(),
            employee_id: Some(4),
            project_id: Some(1),
            status: TaskStatus::Todo,
            due_date: Some(date(2025, 5, 1)),
            priority: TaskPriority::Normal,
            order: 4,
        },
    ]
}

fn notes() -> Vec<Note> {
    vec![
        Note {
            id: 1,
            content: "Klant wil de huisstijlkleuren aanhouden.".to_string(),
            employee_id: Some(1),
            customer_id: Some(1),
            created_at: date(2025, 1, 20),
            order: 1,
        },
        Note {
            id: 2,
            content: "Factuur graag per post ontvangen.".to_string(),
            employee_id: Some(2),
            customer_id: Some(1),
            created_at: date(2025, 2, 3),
            order: 2,
        },
        Note {
            id: 3,
            content: "Contactpersoon spreekt Frans, correspondentie in het Frans.".to_string(),
            employee_id: Some(2),
            customer_id: Some(3),
            created_at: date(2025, 2, 17),
            order: 3,
        },
    ]
}

/// Build a freshly seeded database.
pub fn demo_database() -> Result<Database> {
    let mut db = Database::new();

    for role in roles() {
        resolver::insert_flat(&mut db, EntityKind::Role, &to_row(&role)?);
    }
    for customer in customers() {
        resolver::insert_flat(&mut db, EntityKind::Customer, &to_row(&customer)?);
    }
    for employee in employees() {
        resolver::insert_flat(&mut db, EntityKind::Employee, &to_row(&employee)?);
    }
    for project in projects() {
        resolver::insert_flat(&mut db, EntityKind::Project, &to_row(&project)?);
    }
    for invoice in invoices() {
        resolver::insert_flat(&mut db, EntityKind::Invoice, &to_row(&invoice)?);
    }
    for task in tasks() {
        resolver::insert_flat(&mut db, EntityKind::Task, &to_row(&task)?);
    }
    for note in notes() {
        resolver::insert_flat(&mut db, EntityKind::Note, &to_row(&note)?);
    }

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{row_id, row_order};
    use crate::schema::LOAD_ORDER;

    #[test]
    fn test_seed_populates_every_entity() {
        let db = demo_database().unwrap();
        for kind in LOAD_ORDER {
            assert!(!db.is_empty(kind), "no seed rows for {}", kind);
        }
    }

    #[test]
    fn test_seed_orders_are_dense() {
        let db = demo_database().unwrap();
        for kind in LOAD_ORDER {
            let mut orders: Vec<u64> = db.all(kind).iter().map(row_order).collect();
            orders.sort_unstable();
            let expected: Vec<u64> = (1..=orders.len() as u64).collect();
            assert_eq!(orders, expected, "sparse orders for {}", kind);
        }
    }

    #[test]
    fn test_seed_relations_are_resolved() {
        let db = demo_database().unwrap();
        let employee = db.find_by_id(EntityKind::Employee, 1).unwrap();
        let role = employee.get("role").unwrap();
        assert_eq!(role.get("name").unwrap(), "Engineer");

        let note = db.find_by_id(EntityKind::Note, 1).unwrap();
        assert_eq!(note.get("customer").unwrap().get("id").unwrap(), 1);
        assert!(note.get("customer_id").is_none());
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let db = demo_database().unwrap();
        for kind in LOAD_ORDER {
            let mut ids: Vec<u64> = db.all(kind).iter().filter_map(row_id).collect();
            let before = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), before, "duplicate ids for {}", kind);
            assert_eq!(ids.len(), db.len(kind));
        }
    }
}
