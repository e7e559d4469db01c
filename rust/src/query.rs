//! Plain-English filtering over the loaded tables.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::Result;
use crate::fields::{decode_phase_list, split_list, split_tags};
use crate::models::{Client, Dataset, Task, Worker};
use crate::nl_rule::cached_regex;

/// Rows matching a query plus a one-line account of what was matched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query: String,
    pub clients: Vec<Client>,
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
    pub explanation: String,
}

impl QueryResult {
    pub fn total(&self) -> usize {
        self.clients.len() + self.workers.len() + self.tasks.len()
    }
}

pub const FALLBACK_EXPLANATION: &str = "I couldn't understand your query. Try asking about \
    priority levels, skills, duration, phases, groups, or categories.";

fn number_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"\d+")
}

fn skill_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(
        &RE,
        r"javascript|python|react|node\.js|java|css|html|aws|docker",
    )
}

fn phase_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"phase\s+(\d+)")
}

fn group_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"frontend|backend|design|devops|qa|mobile|development")
}

fn category_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(
        &RE,
        r"development|design|testing|security|integration|analytics",
    )
}

fn task_ref_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"task\s+(\w+)")
}

fn first_number(lower: &str, default: i64) -> Result<i64> {
    Ok(number_regex()?
        .find(lower)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default))
}

fn first_match<'a>(re: &Regex, lower: &'a str) -> Option<&'a str> {
    re.find(lower).map(|m| m.as_str())
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Answer a plain-English question about the tables.
///
/// Branches are tried in order and the first whose keywords appear wins.
/// Unrecognized questions return empty results with a hint.
pub fn query(text: &str, dataset: &Dataset<'_>) -> Result<QueryResult> {
    let lower = text.to_lowercase();
    let has = |word: &str| lower.contains(word);
    let mut result = QueryResult {
        query: text.to_string(),
        ..QueryResult::default()
    };

    if has("priority") && (has("greater") || has("higher") || has(">")) {
        let priority = first_number(&lower, 3)?;
        result.clients = filter(dataset.clients, |c| c.priority_level > priority);
        result.explanation = format!("Found clients with priority level greater than {}", priority);
    } else if has("skill") || skill_regex()?.is_match(&lower) {
        match first_match(skill_regex()?, &lower) {
            Some(skill) => {
                result.workers =
                    filter(dataset.workers, |w| split_tags(&w.skills).iter().any(|s| s == skill));
                result.explanation = format!("Found workers with {} skills", skill);
            }
            None => result.explanation = "No known skill named in the query".to_string(),
        }
    } else if has("duration") && (has("longer") || has("greater") || has(">")) {
        let duration = first_number(&lower, 1)?;
        result.tasks = filter(dataset.tasks, |t| t.duration > duration);
        result.explanation = format!(
            "Found tasks with duration longer than {} phase{}",
            duration,
            plural(duration)
        );
    } else if has("phase") && has("available") {
        let phase = phase_regex()?
            .captures(&lower)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(2);
        result.workers = filter(dataset.workers, |w| {
            decode_phase_list(&w.available_slots).is_ok_and(|slots| slots.contains(&phase))
        });
        result.explanation = format!("Found workers available in phase {}", phase);
    } else if has("group") || has("team") {
        match first_match(group_regex()?, &lower) {
            Some(group) => {
                result.workers =
                    filter(dataset.workers, |w| w.worker_group.to_lowercase().contains(group));
                result.explanation = format!("Found workers in {} group", group);
            }
            None => result.explanation = "No known worker group named in the query".to_string(),
        }
    } else if has("category") || has("type") {
        match first_match(category_regex()?, &lower) {
            Some(category) => {
                result.tasks =
                    filter(dataset.tasks, |t| t.category.to_lowercase().contains(category));
                result.explanation = format!("Found tasks in {} category", category);
            }
            None => result.explanation = "No known task category named in the query".to_string(),
        }
    } else if has("high priority") {
        let task_id = task_ref_regex()?
            .captures(&lower)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_uppercase());
        match task_id {
            Some(task_id) => {
                result.clients = filter(dataset.clients, |c| {
                    c.priority_level >= 4
                        && split_list(&c.requested_task_ids).iter().any(|t| *t == task_id)
                });
                result.explanation = format!("Found high priority clients who requested {}", task_id);
            }
            None => {
                result.clients = filter(dataset.clients, |c| c.priority_level >= 4);
                result.explanation = "Found high priority clients (priority level 4 or 5)".to_string();
            }
        }
    } else if has("available slots") || has("more than") {
        let min_slots = first_number(&lower, 3)?;
        result.workers = filter(dataset.workers, |w| {
            decode_phase_list(&w.available_slots).is_ok_and(|slots| slots.len() as i64 > min_slots)
        });
        result.explanation = format!("Found workers with more than {} available slots", min_slots);
    } else {
        result.explanation = FALLBACK_EXPLANATION.to_string();
    }
    Ok(result)
}

fn filter<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|r| keep(*r)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(id: &str, priority: i64, requested: &str) -> Client {
        Client {
            client_id: id.to_string(),
            client_name: id.to_string(),
            priority_level: priority,
            requested_task_ids: requested.to_string(),
            ..Client::default()
        }
    }

    fn make_worker(id: &str, skills: &str, slots: &str, group: &str) -> Worker {
        Worker {
            worker_id: id.to_string(),
            worker_name: id.to_string(),
            skills: skills.to_string(),
            available_slots: slots.to_string(),
            worker_group: group.to_string(),
            ..Worker::default()
        }
    }

    fn make_task(id: &str, category: &str, duration: i64) -> Task {
        Task {
            task_id: id.to_string(),
            task_name: id.to_string(),
            category: category.to_string(),
            duration,
            ..Task::default()
        }
    }

    struct Fixture {
        clients: Vec<Client>,
        workers: Vec<Worker>,
        tasks: Vec<Task>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                clients: vec![
                    make_client("C1", 5, "T1,T2"),
                    make_client("C2", 2, "T1"),
                    make_client("C3", 4, "T3"),
                ],
                workers: vec![
                    make_worker("W1", "javascript,react", "[1,2,3,4]", "frontend"),
                    make_worker("W2", "java,python", "[2]", "backend"),
                    make_worker("W3", "python", "bad", "Backend"),
                ],
                tasks: vec![
                    make_task("T1", "development", 3),
                    make_task("T2", "testing", 1),
                    make_task("T3", "security-testing", 2),
                ],
            }
        }

        fn ask(&self, text: &str) -> QueryResult {
            query(text, &Dataset::new(&self.clients, &self.workers, &self.tasks)).unwrap()
        }
    }

    fn ids<T>(rows: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        rows.iter().map(|r| id(r).to_string()).collect()
    }

    #[test]
    fn test_priority_greater_than() {
        let result = Fixture::new().ask("Clients with priority greater than 3");
        assert_eq!(ids(&result.clients, |c| &c.client_id), vec!["C1", "C3"]);
        assert!(result.workers.is_empty() && result.tasks.is_empty());
    }

    #[test]
    fn test_skill_uses_exact_tags() {
        let result = Fixture::new().ask("Who knows Java?");
        assert_eq!(ids(&result.workers, |w| &w.worker_id), vec!["W2"]);
        assert_eq!(result.explanation, "Found workers with java skills");
    }

    #[test]
    fn test_duration_longer_than() {
        let result = Fixture::new().ask("tasks with duration longer than 1");
        assert_eq!(ids(&result.tasks, |t| &t.task_id), vec!["T1", "T3"]);
        assert_eq!(result.explanation, "Found tasks with duration longer than 1 phase");
    }

    #[test]
    fn test_phase_availability_skips_malformed_slots() {
        let result = Fixture::new().ask("workers available in phase 2");
        assert_eq!(ids(&result.workers, |w| &w.worker_id), vec!["W1", "W2"]);
    }

    #[test]
    fn test_group_case_insensitive() {
        let result = Fixture::new().ask("show the backend team");
        assert_eq!(ids(&result.workers, |w| &w.worker_id), vec!["W2", "W3"]);
    }

    #[test]
    fn test_category() {
        let result = Fixture::new().ask("tasks of category testing");
        assert_eq!(ids(&result.tasks, |t| &t.task_id), vec!["T2", "T3"]);
    }

    #[test]
    fn test_high_priority_for_task() {
        let fixture = Fixture::new();
        let result = fixture.ask("high priority clients for task t1");
        assert_eq!(ids(&result.clients, |c| &c.client_id), vec!["C1"]);

        let result = fixture.ask("list high priority clients");
        assert_eq!(ids(&result.clients, |c| &c.client_id), vec!["C1", "C3"]);
    }

    #[test]
    fn test_more_than_slots() {
        let result = Fixture::new().ask("workers with more than 2 available slots");
        assert_eq!(ids(&result.workers, |w| &w.worker_id), vec!["W1"]);
    }

    #[test]
    fn test_fallback() {
        let result = Fixture::new().ask("what is the meaning of life");
        assert_eq!(result.total(), 0);
        assert_eq!(result.explanation, FALLBACK_EXPLANATION);
        assert_eq!(result.query, "what is the meaning of life");
    }
}
