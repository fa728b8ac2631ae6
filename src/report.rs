use std::io::{self, Write};

use indexmap::IndexMap;

use crate::constants::STATUS_SUMMARY_HEADING;
use crate::handler::{Handler, HandlerStatus};

/// Number of handlers per status, in the order the statuses were first seen
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatisticsSummary {
    counts: IndexMap<HandlerStatus, usize>,
}

impl StatisticsSummary {
    pub fn collect(handlers: &[Box<dyn Handler>]) -> Self {
        let mut summary = Self::default();
        for handler in handlers {
            summary.record(handler.status());
        }
        summary
    }

    pub fn record(&mut self, status: HandlerStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn count(&self, status: HandlerStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HandlerStatus, usize)> + '_ {
        self.counts.iter().map(|(status, count)| (*status, *count))
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Writes the per-handler results followed by the status summary.
///
/// Handlers that never ran are counted but get no section of their own.
pub fn print_results<W: Write>(
    handlers: &[Box<dyn Handler>],
    out: &mut W,
) -> io::Result<StatisticsSummary> {
    let mut summary = StatisticsSummary::default();

    for handler in handlers {
        summary.record(handler.status());
        if handler.status() == HandlerStatus::NotExecuted {
            continue;
        }

        let label = handler.label();
        writeln!(out)?;
        writeln!(out, "{}", label)?;
        writeln!(out, "{}", "-".repeat(label.chars().count()))?;
        for message in handler.messages() {
            writeln!(out, "{}", message)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", STATUS_SUMMARY_HEADING)?;
    writeln!(out, "{}", "=".repeat(STATUS_SUMMARY_HEADING.len()))?;
    for (status, count) in summary.iter() {
        writeln!(out, "{}: {} handler(s)", status, count)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerState, MessageLevel};

    fn boxed(handlers: Vec<Fixed>) -> Vec<Box<dyn Handler>> {
        handlers
            .into_iter()
            .map(|h| Box::new(h) as Box<dyn Handler>)
            .collect()
    }

    struct Fixed {
        state: HandlerState,
        outcome: Option<HandlerStatus>,
    }

    impl Fixed {
        fn new(param1: &str, outcome: Option<HandlerStatus>) -> Self {
            let mut state = HandlerState::default();
            state.param1 = param1.to_string();
            let mut handler = Self { state, outcome };
            if outcome.is_some() {
                handler.apply();
            }
            handler
        }
    }

    impl Handler for Fixed {
        fn state(&self) -> &HandlerState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut HandlerState {
            &mut self.state
        }

        fn apply(&mut self) -> bool {
            let status = self.outcome.unwrap_or(HandlerStatus::Done);
            self.state.add_message(MessageLevel::Ok, format!("set {}", self.state.param1));
            self.state.finish(status)
        }

        fn label(&self) -> String {
            format!("Fixed {}", self.state.param1)
        }
    }

    #[test]
    fn test_print_results_layout() {
        let handlers = boxed(vec![
            Fixed::new("one", Some(HandlerStatus::Done)),
            Fixed::new("two", Some(HandlerStatus::Error)),
            Fixed::new("three", None),
        ]);
        let mut out = Vec::new();

        let summary = print_results(&handlers, &mut out).unwrap();

        let expected = "\nFixed one\n---------\n[OK] set one\n\
                        \nFixed two\n---------\n[OK] set two\n\
                        \nStatus summary:\n===============\n\
                        done: 1 handler(s)\nerror: 1 handler(s)\nnot_executed: 1 handler(s)\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_summary_keeps_first_seen_order() {
        let handlers = boxed(vec![
            Fixed::new("a", None),
            Fixed::new("b", Some(HandlerStatus::Skipped)),
            Fixed::new("c", None),
        ]);

        let summary = StatisticsSummary::collect(&handlers);

        let order: Vec<(HandlerStatus, usize)> = summary.iter().collect();
        assert_eq!(
            order,
            vec![(HandlerStatus::NotExecuted, 2), (HandlerStatus::Skipped, 1)]
        );
        assert_eq!(summary.count(HandlerStatus::Done), 0);
    }

    #[test]
    fn test_empty_run_prints_only_heading() {
        let mut out = Vec::new();
        let summary = print_results(&[], &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nStatus summary:\n===============\n"
        );
        assert_eq!(summary.total(), 0);
    }
}
