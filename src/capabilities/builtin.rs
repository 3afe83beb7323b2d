//! Built-in event-planning tool catalog.
//!
//! These are the tools the event-planning crew is wired against. Planning,
//! fundraising and quality tools produce simulated reports; `db.query` and
//! `file.read` only echo what they would do. `user.ask_input` is the one
//! interactive tool: it asks the operator through a `TimeoutInputGate`.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::capability::{
    number_or, optional_str, required_str, CapabilityName, CapabilityTool, FunctionTool,
};
use super::registry::CapabilityRegistry;
use crate::core::providers::human_input::{DefaultResponses, TimeoutInputGate};
use crate::utilities::errors::{RegistryError, ToolError};

/// Answer the ask tool returns when the operator wants to stop.
pub const TERMINATE: &str = "TERMINATE";

/// Operator answers that end the conversation.
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "terminate"];

/// Rows of sheet-like output shown before truncating.
const MAX_LISTED_ITEMS: usize = 10;

fn name(s: &'static str) -> CapabilityName {
    CapabilityName::builtin(s)
}

/// Every non-interactive tool in the catalog.
pub fn event_planning_tools() -> Vec<FunctionTool> {
    vec![
        FunctionTool::new(
            name("event.plan_event"),
            "Plan an event with specified details",
            json!({
                "type": "object",
                "properties": {
                    "event_name": {"type": "string"},
                    "theme": {"type": "string"},
                    "organization": {"type": "string"},
                    "requirements": {"type": "string"},
                },
                "required": ["event_name"],
            }),
            plan_event,
        ),
        FunctionTool::new(
            name("event.get_venue_suggestions"),
            "Get venue suggestions for an event",
            json!({
                "type": "object",
                "properties": {
                    "event_type": {"type": "string"},
                    "capacity": {"type": "integer"},
                    "location": {"type": "string"},
                    "budget_range": {"type": "string", "enum": ["low", "medium", "high"]},
                },
                "required": ["event_type"],
            }),
            venue_suggestions,
        ),
        FunctionTool::new(
            name("fundraising.create_plan"),
            "Create a fundraising plan",
            json!({
                "type": "object",
                "properties": {
                    "goal": {"type": "string"},
                    "event_name": {"type": "string"},
                    "budget_target": {"type": "number"},
                },
                "required": ["goal"],
            }),
            fundraising_plan,
        ),
        FunctionTool::new(
            name("fundraising.calculate_budget"),
            "Calculate total event budget with breakdown",
            json!({
                "type": "object",
                "properties": {
                    "venue_cost": {"type": "number"},
                    "catering_cost": {"type": "number"},
                    "materials_cost": {"type": "number"},
                    "marketing_cost": {"type": "number"},
                    "contingency_percent": {"type": "number"},
                },
                "required": ["venue_cost", "catering_cost"],
            }),
            calculate_budget,
        ),
        FunctionTool::new(
            name("quality.check_deliverable"),
            "Perform quality assurance checks on a deliverable",
            json!({
                "type": "object",
                "properties": {
                    "item": {"type": "string"},
                    "category": {"type": "string"},
                    "criteria": {"type": "string"},
                },
                "required": ["item"],
            }),
            check_deliverable,
        ),
        FunctionTool::new(
            name("quality.create_checklist"),
            "Create a quality assurance checklist for a project type",
            json!({
                "type": "object",
                "properties": {
                    "project_type": {"type": "string"},
                    "specific_requirements": {"type": "string"},
                },
                "required": ["project_type"],
            }),
            create_checklist,
        ),
        FunctionTool::new(
            name("db.query"),
            "Execute database queries",
            json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"],
            }),
            |args| {
                let query = required_str(args, "query")?;
                Ok(json!(format!(
                    "Database: Executed query '{}' - Results would appear here.",
                    query
                )))
            },
        ),
        FunctionTool::new(
            name("file.read"),
            "Read file contents",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"],
            }),
            |args| {
                let path = required_str(args, "path")?;
                Ok(json!(format!(
                    "File System: Read file '{}' - Content would appear here.",
                    path
                )))
            },
        ),
    ]
}

/// Registry holding the full catalog, including `user.ask_input`.
pub fn event_planning_registry(ask_user: AskUserTool) -> Result<CapabilityRegistry, RegistryError> {
    let mut registry = CapabilityRegistry::new();
    for tool in event_planning_tools() {
        registry.register(tool)?;
    }
    registry.register(ask_user)?;
    Ok(registry)
}

// ---------------------------------------------------------------------------
// user.ask_input
// ---------------------------------------------------------------------------

/// Asks the operator a question, falling back to a default on timeout.
#[derive(Debug, Clone)]
pub struct AskUserTool {
    name: CapabilityName,
    gate: TimeoutInputGate,
    timeout: Duration,
    defaults: DefaultResponses,
}

impl AskUserTool {
    pub fn new(gate: TimeoutInputGate, timeout: Duration, defaults: DefaultResponses) -> Self {
        Self {
            name: name("user.ask_input"),
            gate,
            timeout,
            defaults,
        }
    }
}

#[async_trait]
impl CapabilityTool for AskUserTool {
    fn name(&self) -> &CapabilityName {
        &self.name
    }

    fn description(&self) -> &str {
        "Ask the user for input when needed"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"question": {"type": "string"}},
            "required": ["question"],
        })
    }

    async fn invoke(&self, args: HashMap<String, Value>) -> Result<Value, ToolError> {
        let question = required_str(&args, "question")?.to_string();
        let prompt = format!("{}\n> ", question);
        let fallback = self.defaults.fallback_for(&question).to_string();
        let answer = self
            .gate
            .request_input(&prompt, self.timeout, fallback)
            .await?;
        let answer = answer.trim();
        if EXIT_WORDS.contains(&answer.to_lowercase().as_str()) {
            return Ok(json!(TERMINATE));
        }
        Ok(json!(answer))
    }
}

// ---------------------------------------------------------------------------
// Report builders
// ---------------------------------------------------------------------------

fn plan_event(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let event_name = required_str(args, "event_name")?;
    let theme = optional_str(args, "theme");
    let organization = optional_str(args, "organization");
    let requirements = optional_str(args, "requirements");

    let mut out = format!("Event Coordinator: Planning event '{}'", event_name);
    if !theme.is_empty() {
        write!(out, " with theme '{}'", theme)?;
    }
    if !organization.is_empty() {
        write!(out, " for {}", organization)?;
    }
    out.push('.');
    if !requirements.is_empty() {
        write!(out, " Requirements: {}", requirements)?;
    }
    Ok(json!(out))
}

fn venue_suggestions(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let event_type = required_str(args, "event_type")?;
    let capacity = number_or(args, "capacity", 50.0) as u64;
    let location = optional_str(args, "location");
    let budget_range = match optional_str(args, "budget_range") {
        "" => "medium",
        other => other,
    };

    let venues: &[&str] = match event_type.to_lowercase().as_str() {
        "conference" => &["Convention Center", "Hotel Conference Room", "University Auditorium"],
        "party" => &["Community Center", "Restaurant Private Room", "Outdoor Pavilion"],
        "meeting" => &["Office Conference Room", "Library Meeting Room", "Coworking Space"],
        "cultural" => &["Cultural Center", "Museum Event Space", "Art Gallery"],
        _ => &["Community Center", "Hotel Meeting Room"],
    };

    let mut out = format!(
        "Event Venue Suggestions for {} ({} people):\n\n",
        event_type, capacity
    );
    for (i, venue) in venues.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, venue)?;
        writeln!(out, "   Capacity: Suitable for {} attendees", capacity)?;
        writeln!(out, "   Budget: {} range", title_case(budget_range))?;
        if !location.is_empty() {
            writeln!(out, "   Location: Near {}", location)?;
        }
        out.push('\n');
    }
    Ok(json!(out))
}

fn fundraising_plan(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let goal = required_str(args, "goal")?;
    let event_name = optional_str(args, "event_name");
    let budget_target = number_or(args, "budget_target", 0.0);

    let mut out = format!("Fundraising Coordinator: Creating plan for '{}'", goal);
    if !event_name.is_empty() {
        write!(out, " related to {}", event_name)?;
    }

    if budget_target > 0.0 {
        write!(out, "\n\nBudget Target: {}", money(budget_target))?;
        let strategies: &[&str] = if budget_target < 1000.0 {
            &["Bake sale", "Small donations", "Ticket sales"]
        } else if budget_target < 5000.0 {
            &["Silent auction", "Corporate sponsorships", "Crowdfunding"]
        } else {
            &["Major donor outreach", "Grant applications", "Premium sponsorships"]
        };
        out.push_str("\n\nRecommended Strategies:\n");
        push_numbered(&mut out, strategies)?;
    }

    out.push_str("\n\nNext Steps:\n");
    push_numbered(
        &mut out,
        &[
            "Identify potential donors and sponsors",
            "Create compelling fundraising materials",
            "Set up donation tracking system",
            "Launch fundraising campaign",
        ],
    )?;
    Ok(json!(out))
}

fn calculate_budget(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let required_number = |key: &str| -> Result<f64, ToolError> {
        args.get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("missing required argument '{}'", key).into())
    };
    let venue = required_number("venue_cost")?;
    let catering = required_number("catering_cost")?;
    let materials = number_or(args, "materials_cost", 0.0);
    let marketing = number_or(args, "marketing_cost", 0.0);
    let contingency_percent = number_or(args, "contingency_percent", 10.0);

    let subtotal = venue + catering + materials + marketing;
    let contingency = subtotal * (contingency_percent / 100.0);
    let total = subtotal + contingency;

    let mut out = String::from("Event Budget Calculation:\n\nCost Breakdown:\n");
    for (label, amount) in [
        ("Venue", venue),
        ("Catering", catering),
        ("Materials", materials),
        ("Marketing", marketing),
        ("Subtotal", subtotal),
    ] {
        writeln!(out, "  {:<15} {:>12}", format!("{}:", label), money(amount))?;
    }
    writeln!(
        out,
        "  {:<15} {:>12} ({}%)",
        "Contingency:",
        money(contingency),
        contingency_percent
    )?;
    writeln!(out, "  {:<15} {:>12}\n", "TOTAL:", money(total))?;

    out.push_str("Fundraising Recommendations:\n");
    let tips: &[&str] = if total < 1000.0 {
        &[
            "Focus on small-scale fundraising activities",
            "Seek local business sponsorships",
        ]
    } else if total < 5000.0 {
        &[
            "Organize multiple fundraising events",
            "Apply for community grants",
        ]
    } else {
        &[
            "Seek major corporate sponsorships",
            "Apply for large grants",
            "Consider premium ticket pricing",
        ]
    };
    for tip in tips {
        writeln!(out, "- {}", tip)?;
    }
    Ok(json!(out))
}

fn check_deliverable(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let item = required_str(args, "item")?;
    let category = optional_str(args, "category");
    let criteria = optional_str(args, "criteria");

    let mut out = format!("Quality Checker: Reviewing '{}'", item);
    if !category.is_empty() {
        write!(out, " in category '{}'", category)?;
    }
    out.push_str(" for quality assurance.\n\n");

    let checks: &[&str] = match category.to_lowercase().as_str() {
        "document" | "plan" | "proposal" => &[
            "Content accuracy and completeness",
            "Grammar and spelling",
            "Formatting and presentation",
            "Adherence to guidelines",
            "Clarity and readability",
        ],
        "event" | "activity" => &[
            "Schedule feasibility",
            "Resource availability",
            "Safety considerations",
            "Accessibility compliance",
            "Backup plans",
        ],
        _ => &[
            "Meets requirements",
            "Quality standards",
            "Functionality",
            "User experience",
            "Risk assessment",
        ],
    };
    out.push_str("Quality Checklist:\n");
    push_numbered(&mut out, checks)?;

    if !criteria.is_empty() {
        write!(out, "\nSpecific Criteria: {}\n", criteria)?;
    }
    out.push_str("\nStatus: Under Review\n");
    Ok(json!(out))
}

fn create_checklist(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let project_type = required_str(args, "project_type")?;
    let extra = optional_str(args, "specific_requirements");

    let items: &[&str] = match project_type.to_lowercase().as_str() {
        "event" => &[
            "Venue confirmed and accessible",
            "Catering arranged with dietary options",
            "Audio/visual equipment tested",
            "Registration system working",
            "Emergency procedures in place",
            "Staff briefed on responsibilities",
            "Backup plans documented",
        ],
        "document" => &[
            "Content reviewed for accuracy",
            "Grammar and spelling checked",
            "Formatting consistent",
            "All references verified",
            "Version control maintained",
            "Approval signatures obtained",
            "Distribution list confirmed",
        ],
        "marketing" => &[
            "Target audience defined",
            "Messaging consistent across channels",
            "Visual design approved",
            "Contact information verified",
            "Legal compliance checked",
            "Performance metrics defined",
            "Launch timeline confirmed",
        ],
        _ => &[
            "Requirements clearly defined",
            "Quality standards established",
            "Testing procedures completed",
            "Stakeholder approval obtained",
            "Documentation updated",
            "Risk assessment completed",
        ],
    };

    let mut out = format!(
        "Quality Checklist for {} Project:\n\n",
        title_case(project_type)
    );
    for (i, item) in items.iter().take(MAX_LISTED_ITEMS).enumerate() {
        writeln!(out, "[ ] {}. {}", i + 1, item)?;
    }
    if !extra.is_empty() {
        write!(out, "\nAdditional Requirements:\n[ ] {}\n", extra)?;
    }
    out.push_str("\nInstructions:\n");
    out.push_str("- Check off each item as completed\n");
    out.push_str("- Document any issues or exceptions\n");
    out.push_str("- Obtain stakeholder sign-off before proceeding\n");
    Ok(json!(out))
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn push_numbered(out: &mut String, items: &[&str]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, item)?;
    }
    Ok(())
}

/// `1234.5` -> `$1,234.50`.
fn money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::input_channel::ReplyInputChannel;
    use crate::core::providers::notices::CollectingNotices;
    use std::sync::Arc;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn ask_tool(timeout: Duration) -> (tokio::sync::mpsc::Sender<String>, AskUserTool) {
        let (tx, channel) = ReplyInputChannel::new(4);
        let gate = TimeoutInputGate::new(Arc::new(channel), Arc::new(CollectingNotices::new()));
        (tx, AskUserTool::new(gate, timeout, DefaultResponses::default()))
    }

    #[test]
    fn test_catalog_registers_cleanly() {
        let (_tx, ask) = ask_tool(Duration::from_secs(1));
        let registry = event_planning_registry(ask).unwrap();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.list_by_namespace("event").len(), 2);
        assert!(registry.contains("user.ask_input"));
    }

    #[tokio::test]
    async fn test_plan_event_report() {
        let tool = event_planning_tools().remove(0);
        let out = tool
            .invoke(args(json!({
                "event_name": "Spring Gala",
                "theme": "Renewal",
                "organization": "Arts Club",
            })))
            .await
            .unwrap();
        assert_eq!(
            out,
            json!("Event Coordinator: Planning event 'Spring Gala' with theme 'Renewal' for Arts Club.")
        );
    }

    #[test]
    fn test_budget_calculation() {
        let out = calculate_budget(&args(json!({
            "venue_cost": 2000,
            "catering_cost": 1500.5,
            "contingency_percent": 10,
        })))
        .unwrap();
        let text = out.as_str().unwrap();
        assert!(text.contains("$3,500.50"));
        assert!(text.contains("$3,850.55"));
        assert!(text.contains("Apply for community grants"));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = check_deliverable(&HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing required argument 'item'");
    }

    #[test]
    fn test_money_and_title_case() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(999.999), "$1,000.00");
        assert_eq!(money(1234567.8), "$1,234,567.80");
        assert_eq!(title_case("medium"), "Medium");
        assert_eq!(title_case("EVENT planning"), "Event Planning");
    }

    #[tokio::test]
    async fn test_ask_user_answer_and_terminate() {
        let (tx, tool) = ask_tool(Duration::from_secs(5));
        tx.send("  Ada  ".to_string()).await.unwrap();
        let out = tool.invoke(args(json!({"question": "Your name?"}))).await.unwrap();
        assert_eq!(out, json!("Ada"));

        tx.send("Quit".to_string()).await.unwrap();
        let out = tool.invoke(args(json!({"question": "More?"}))).await.unwrap();
        assert_eq!(out, json!(TERMINATE));
    }

    #[tokio::test]
    async fn test_ask_user_times_out_to_smart_default() {
        let (_tx, tool) = ask_tool(Duration::from_millis(10));
        let out = tool
            .invoke(args(json!({"question": "What is your name?"})))
            .await
            .unwrap();
        assert_eq!(out, json!("Anonymous User"));
    }
}
