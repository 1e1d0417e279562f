// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page selection — partitions the script into per-page command queues.

use pdfstamp_core::error::{Result, StampError};
use pdfstamp_core::{Command, Opcode, Value};
use tracing::debug;

/// The set of pages subsequent commands apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    /// `active[i]` is page `i + 1`.
    active: Vec<bool>,
}

impl PageSelection {
    /// The initial selection: page 1 only.
    pub fn first_page(page_count: usize) -> Self {
        let mut active = vec![false; page_count];
        if let Some(first) = active.first_mut() {
            *first = true;
        }
        Self { active }
    }

    /// Build a selection from `pages` tokens: `N`, `from-to`, `from-`, `-to`.
    pub fn from_tokens(tokens: &[Value], page_count: usize) -> Result<Self> {
        let mut active = vec![false; page_count];
        for token in tokens {
            select_token(token.as_str(), &mut active)?;
        }
        Ok(Self { active })
    }

    pub fn contains(&self, page_number: usize) -> bool {
        page_number
            .checked_sub(1)
            .and_then(|index| self.active.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Selected page numbers in ascending order.
    pub fn pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(index, _)| index + 1)
    }
}

fn page_number(text: &str, token: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number),
        _ => Err(StampError::PageRange(format!("invalid page number in {token:?}"))),
    }
}

fn select_token(token: &str, active: &mut [bool]) -> Result<()> {
    let page_count = active.len();
    match token.split_once('-') {
        None => {
            let number = page_number(token, token)?;
            if number > page_count {
                return Err(StampError::PageRange(format!(
                    "page {number} does not exist (document has {page_count} pages)"
                )));
            }
            active[number - 1] = true;
        }
        Some((from, to)) => {
            let from = if from.trim().is_empty() {
                1
            } else {
                page_number(from, token)?
            };
            let to = if to.trim().is_empty() {
                None
            } else {
                Some(page_number(to, token)?)
            };
            if let Some(to) = to
                && from > to
            {
                return Err(StampError::PageRange(format!("reversed range {token:?}")));
            }
            let last = to.unwrap_or(page_count).min(page_count);
            for number in from..=last {
                active[number - 1] = true;
            }
        }
    }
    Ok(())
}

/// Per-page command queues, in script order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQueues {
    queues: Vec<Vec<Command>>,
}

impl PageQueues {
    /// Walk the script once, assigning each non-selector command to every
    /// page active at that point.
    pub fn partition(commands: &[Command], page_count: usize) -> Result<Self> {
        if page_count == 0 {
            return Err(StampError::PageRange("document has no pages".into()));
        }
        let mut selection = PageSelection::first_page(page_count);
        let mut queues = vec![Vec::new(); page_count];

        for command in commands {
            if command.opcode() == Opcode::Pages {
                selection = PageSelection::from_tokens(command.args(), page_count)?;
                debug!(pages = ?selection.pages().collect::<Vec<_>>(), "page selection changed");
                continue;
            }
            for page in selection.pages() {
                queues[page - 1].push(command.clone());
            }
        }

        Ok(Self { queues })
    }

    pub fn page_count(&self) -> usize {
        self.queues.len()
    }

    /// The queue of page `page_number` (1-indexed); empty if out of range.
    pub fn page(&self, page_number: usize) -> &[Command] {
        page_number
            .checked_sub(1)
            .and_then(|index| self.queues.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pages with at least one command, with their queues.
    pub fn non_empty(&self) -> impl Iterator<Item = (usize, &[Command])> + '_ {
        self.queues
            .iter()
            .enumerate()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(index, queue)| (index + 1, queue.as_slice()))
    }
}
