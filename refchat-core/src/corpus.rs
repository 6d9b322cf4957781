//! Built-in canned answers and the sessions written on first boot.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::{CannedAnswer, Message, Session, Table};

/// The six pre-authored answers, in rotation order.
pub fn canned_answers() -> Vec<CannedAnswer> {
    vec![
        CannedAnswer {
            id: Uuid::from_u128(0x6f1c_2a10_0b1e_4c55_9a01_0000_0000_0001),
            answer_text: "Quarterly performance analysis shows revenue growth across all quarters. Q1 revenue ₹10L, Q2 ₹11L, Q3 ₹12L. Profit margins: Q1 ₹1L, Q2 ₹1.2L, Q3 ₹1.5L.".to_string(),
            table: Table::from_rows(
                ["Company", "Q1 Revenue", "Q2 Revenue", "Q3 Revenue"],
                &[
                    ["Tech Solutions India", "₹10L", "₹11L", "₹12L"],
                    ["Digital Services Pvt Ltd", "₹8L", "₹9L", "₹10L"],
                    ["Innovation Hub", "₹12L", "₹13L", "₹14L"],
                ],
            ),
            metadata: json!({ "type": "financial", "source": "survey" }),
        },
        CannedAnswer {
            id: Uuid::from_u128(0x6f1c_2a10_0b1e_4c55_9a01_0000_0000_0002),
            answer_text: "Employee satisfaction survey results across IT companies. Overall satisfaction score: 78%. Key factors: work-life balance, salary, growth opportunities.".to_string(),
            table: Table::from_rows(
                ["Company", "Satisfaction %", "Employees", "Rating"],
                &[
                    ["Infosys Hyderabad", "82%", "1,250", "4.1/5"],
                    ["TCS Vijayawada", "79%", "980", "3.9/5"],
                    ["Wipro Visakhapatnam", "75%", "650", "3.8/5"],
                ],
            ),
            metadata: json!({ "type": "survey" }),
        },
        CannedAnswer {
            id: Uuid::from_u128(0x6f1c_2a10_0b1e_4c55_9a01_0000_0000_0003),
            answer_text: "Market share analysis for software companies in Andhra Pradesh. Top 3 companies hold 65% of the market. Growth rate: 12% YoY.".to_string(),
            table: Table::from_rows(
                ["Company", "Market Share %", "Revenue (₹Cr)", "Growth %"],
                &[
                    ["TechCorp India", "28%", "₹45", "15%"],
                    ["DataSoft Solutions", "22%", "₹38", "12%"],
                    ["CloudTech Systems", "15%", "₹28", "10%"],
                ],
            ),
            metadata: json!({ "type": "market" }),
        },
        CannedAnswer {
            id: Uuid::from_u128(0x6f1c_2a10_0b1e_4c55_9a01_0000_0000_0004),
            answer_text: "Customer retention survey results. Average retention rate: 85%. Top performing companies show 90%+ retention. Primary reasons: service quality and pricing.".to_string(),
            table: Table::from_rows(
                ["Company", "Retention %", "Customers", "Satisfaction"],
                &[
                    ["ServicePro Ltd", "92%", "5,420", "4.5/5"],
                    ["CustomerFirst Inc", "88%", "3,850", "4.3/5"],
                    ["Quality Services", "85%", "2,960", "4.1/5"],
                ],
            ),
            metadata: json!({ "type": "retention" }),
        },
        CannedAnswer {
            id: Uuid::from_u128(0x6f1c_2a10_0b1e_4c55_9a01_0000_0000_0005),
            answer_text: "Productivity metrics across development teams. Average productivity index: 7.8/10. Teams using agile methodology show 15% higher productivity.".to_string(),
            table: Table::from_rows(
                ["Company", "Productivity Index", "Team Size", "Projects"],
                &[
                    ["DevTech Solutions", "8.5/10", "45", "12"],
                    ["CodeWorks India", "8.0/10", "38", "10"],
                    ["Agile Systems", "7.5/10", "32", "8"],
                ],
            ),
            metadata: json!({ "type": "productivity" }),
        },
        CannedAnswer {
            id: Uuid::from_u128(0x6f1c_2a10_0b1e_4c55_9a01_0000_0000_0006),
            answer_text: "Technology adoption survey in Andhra Pradesh companies. Cloud adoption: 68%, AI/ML: 42%, DevOps: 55%. Top adopters show 25% efficiency improvement.".to_string(),
            table: Table::from_rows(
                ["Company", "Cloud %", "AI/ML %", "DevOps %"],
                &[
                    ["CloudFirst Technologies", "95%", "78%", "88%"],
                    ["AI Innovations Pvt Ltd", "82%", "92%", "75%"],
                    ["Modern Tech Solutions", "75%", "65%", "82%"],
                ],
            ),
            metadata: json!({ "type": "technology" }),
        },
    ]
}

/// Sessions written to a fresh or unreadable store file.
pub fn seed_sessions() -> Vec<Session> {
    let corpus = canned_answers();
    let seeds = [
        ("Quarterly revenue analysis", "Show quarterly revenue analysis", &corpus[0]),
        ("Employee satisfaction survey", "Employee satisfaction survey results", &corpus[1]),
    ];

    seeds
        .into_iter()
        .map(|(title, question, answer)| {
            let now = Utc::now();
            Session {
                session_id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                created_at: now,
                last_updated: Some(now),
                messages: vec![Message::user(question), Message::assistant(answer)],
            }
        })
        .collect()
}
