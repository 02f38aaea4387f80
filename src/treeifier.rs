// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/treeifier.rs - Tag stream to tree conversion for ODB++ records.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `treeifier` Module
 *
 * Line record files describe nested structures, such as surfaces made of
 * polygons, as flat runs of begin, body and end records. [treeify] rebuilds
 * the nesting from a flat tag stream using [NestingRule]s, and collapses
 * every closed scope into a domain object as soon as its end tag arrives.
 *
 * Scopes are closed strictly innermost first: an end tag is only compared
 * against the rule on top of the stack. Scopes that are still open when the
 * input runs out are dropped together with everything they collected.
 */

use std::fmt;

use log::{debug, trace};

use crate::error::{Error, Result};

/// A decoded record that the treeifier can classify by kind.
pub trait Tag {
    /// Field-less discriminant used to match tags against rules.
    type Kind: Copy + PartialEq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// An element of a scope buffer or of the treeifier output.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T, R> {
    /// A tag passed through as-is, or the start tag of a scope.
    Tag(T),
    /// The reduction of a closed scope.
    Reduced(R),
}

impl<T, R> Node<T, R> {
    pub fn as_tag(&self) -> Option<&T> {
        match self {
            Node::Tag(tag) => Some(tag),
            Node::Reduced(_) => None,
        }
    }

    pub fn as_reduced(&self) -> Option<&R> {
        match self {
            Node::Reduced(reduced) => Some(reduced),
            Node::Tag(_) => None,
        }
    }

    pub fn into_reduced(self) -> Option<R> {
        match self {
            Node::Reduced(reduced) => Some(reduced),
            Node::Tag(_) => None,
        }
    }
}

/// Collapses the buffer of one closed scope. The buffer starts with the
/// scope's start tag and does not include the end tag.
pub type Reducer<T, R> = fn(Vec<Node<T, R>>) -> Result<R>;

/// Start and end kinds of a nested construct, plus its reducer.
pub struct NestingRule<T: Tag, R> {
    pub start: T::Kind,
    pub end: T::Kind,
    pub reduce: Reducer<T, R>,
}

impl<T: Tag, R> NestingRule<T, R> {
    pub fn new(start: T::Kind, end: T::Kind, reduce: Reducer<T, R>) -> Self {
        Self { start, end, reduce }
    }

    pub fn is_start(&self, tag: &T) -> bool {
        tag.kind() == self.start
    }

    pub fn is_end(&self, tag: &T) -> bool {
        tag.kind() == self.end
    }
}

impl<T: Tag, R> Clone for NestingRule<T, R> {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            end: self.end,
            reduce: self.reduce,
        }
    }
}

impl<T: Tag, R> fmt::Debug for NestingRule<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestingRule")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

/// Builds the nested structure described by a flat tag stream.
///
/// For each tag, in order:
///
/// 1. if it is the end kind of the innermost open rule, that scope is
///    closed and its reduction is appended to the enclosing buffer;
/// 2. otherwise, if some rule starts with its kind (first in `rules`
///    order), a new scope is opened with the tag as its first element;
/// 3. otherwise it is appended to the current buffer unchanged.
///
/// Returns the top-level buffer. A reducer failure aborts the whole call
/// with [Error::Reduction].
pub fn treeify<I, T, R>(tags: I, rules: &[NestingRule<T, R>]) -> Result<Vec<Node<T, R>>>
where
    I: IntoIterator<Item = T>,
    T: Tag + fmt::Debug,
{
    let mut open: Vec<&NestingRule<T, R>> = Vec::new();
    // Always one longer than `open`; index 0 is the top-level result.
    let mut buffers: Vec<Vec<Node<T, R>>> = vec![Vec::new()];

    for tag in tags {
        if let Some(&rule) = open.last() {
            if rule.is_end(&tag) {
                open.pop();
                let scope = buffers.pop().unwrap_or_default();
                trace!("closing {:?} scope with {} elements", rule.start, scope.len());

                let opener = scope
                    .first()
                    .and_then(Node::as_tag)
                    .map(|start| format!("{start:?}"));
                let reduced = (rule.reduce)(scope).map_err(|e| Error::Reduction {
                    scope: opener.unwrap_or_default(),
                    source: Box::new(e),
                })?;
                push_node(&mut buffers, Node::Reduced(reduced));
                continue;
            }
        }

        if let Some(rule) = rules.iter().find(|rule| rule.is_start(&tag)) {
            trace!("opening {:?} scope", rule.start);
            open.push(rule);
            buffers.push(vec![Node::Tag(tag)]);
            continue;
        }

        push_node(&mut buffers, Node::Tag(tag));
    }

    if !open.is_empty() {
        let dropped: usize = buffers[1..].iter().map(Vec::len).sum();
        debug!(
            "discarding {} unterminated scope(s) holding {} element(s)",
            open.len(),
            dropped
        );
    }

    buffers.truncate(1);
    Ok(buffers.pop().unwrap_or_default())
}

fn push_node<T, R>(buffers: &mut [Vec<Node<T, R>>], node: Node<T, R>) {
    if let Some(current) = buffers.last_mut() {
        current.push(node);
    }
}
