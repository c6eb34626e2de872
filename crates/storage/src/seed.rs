//! Mock dataset every session starts from.

use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{DeliveryId, DeliveryStatus, IssueId, IssueStatus, Priority, Role, UserId},
    records::{Delivery, Issue, User},
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap_or(NaiveDateTime::MIN)
}

fn user(id: &str, name: &str, username: &str, password: &str, role: Role) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        role,
    }
}

pub fn seed_users() -> Vec<User> {
    vec![
        user("1", "Equipe Engenharia", "engenharia", "1957", Role::Engenharia),
        user("2", "Ailton", "ailton", "123", Role::MestreDeObras),
        user("3", "Iltinho", "iltinho", "123", Role::MestreDeObras),
        user("4", "Geraldo", "geraldo", "123", Role::MestreDeObras),
        user("5", "Diego", "diego", "123", Role::Empreiteiro),
        user("6", "Almoxarifado", "almox", "123", Role::Almoxarifado),
        user("7", "Antônio", "antonio", "123", Role::Almoxarifado),
        user("8", "Izaias", "izaias", "123", Role::Almoxarifado),
    ]
}

pub fn seed_issues() -> Vec<Issue> {
    vec![
        Issue {
            id: IssueId::from("1"),
            title: "Falta rejunte banheiro".into(),
            description: "Falta aplicação de rejunte epóxi no box do banheiro da suíte master. Necessário limpeza prévia.".into(),
            priority: Priority::High,
            assignee: "João Silva (Azulejista)".into(),
            requested_by: "Engenharia".into(),
            deadline: date(2023, 10, 25),
            location: "Bloco A, Apto 302".into(),
            photos: vec!["https://picsum.photos/400/300".into()],
            status: IssueStatus::Open,
            created_at: at(date(2023, 10, 20), 0, 0),
            completion_photos: None,
            rejection_reason: None,
        },
        Issue {
            id: IssueId::from("2"),
            title: "Pintura descascando".into(),
            description: "Parede da sala apresenta descascamento próximo ao rodapé. Possível umidade.".into(),
            priority: Priority::Medium,
            assignee: "Maria Pinturas Ltda".into(),
            requested_by: "Ailton".into(),
            deadline: date(2023, 10, 28),
            location: "Bloco B, Hall de Entrada".into(),
            photos: Vec::new(),
            status: IssueStatus::WaitingApproval,
            created_at: at(date(2023, 10, 18), 0, 0),
            completion_photos: Some(vec!["https://picsum.photos/id/11/400/300".into()]),
            rejection_reason: None,
        },
        Issue {
            id: IssueId::from("3"),
            title: "Instalação Elétrica Exposta".into(),
            description: "Fios expostos na caixa de passagem do corredor principal.".into(),
            priority: Priority::High,
            assignee: "EletroRápido".into(),
            requested_by: "Geraldo".into(),
            deadline: date(2023, 10, 22),
            location: "Área Comum, 1º Andar".into(),
            photos: Vec::new(),
            status: IssueStatus::WaitingApproval,
            created_at: at(date(2023, 10, 21), 0, 0),
            completion_photos: None,
            rejection_reason: None,
        },
        Issue {
            id: IssueId::from("4"),
            title: "Vidro da varanda riscado".into(),
            description: "Vidro temperado da varanda gourmet apresenta riscos profundos.".into(),
            priority: Priority::Low,
            assignee: "Vidraçaria Transparente".into(),
            requested_by: "Diego".into(),
            deadline: date(2023, 10, 15),
            location: "Bloco A, Apto 101".into(),
            photos: Vec::new(),
            status: IssueStatus::Done,
            created_at: at(date(2023, 10, 10), 0, 0),
            completion_photos: Some(vec!["https://picsum.photos/id/15/400/300".into()]),
            rejection_reason: None,
        },
    ]
}

pub fn seed_deliveries() -> Vec<Delivery> {
    vec![
        Delivery {
            id: DeliveryId::from("101"),
            material: "Cimento CP-II".into(),
            supplier: "Votorantim".into(),
            quantity: 50.0,
            unit: "sacos".into(),
            expected_date: at(date(2023, 10, 24), 8, 0),
            invoice_number: None,
            status: DeliveryStatus::Scheduled,
            received_at: None,
            receiver_name: None,
            signature: None,
            receipt_photos: Vec::new(),
        },
        Delivery {
            id: DeliveryId::from("102"),
            material: "Porcelanato 80x80".into(),
            supplier: "Portobello Shop".into(),
            quantity: 120.0,
            unit: "m²".into(),
            expected_date: at(date(2023, 10, 22), 14, 0),
            invoice_number: Some("NF-98765".into()),
            status: DeliveryStatus::Checked,
            received_at: Some(at(date(2023, 10, 22), 14, 30)),
            receiver_name: Some("Antônio".into()),
            signature: None,
            receipt_photos: Vec::new(),
        },
    ]
}
