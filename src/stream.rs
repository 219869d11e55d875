// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Lazy iteration over the documents of a YAML stream.

use crate::error::LoadError;
use crate::loader::Loader;
use crate::span::Position;
use crate::value::Document;

/// A lazy iterator over the documents of a YAML stream.
///
/// Each call to [`Iterator::next`] reads exactly one document; input past
/// the last returned document boundary has not been examined yet. The first
/// error terminates the stream: after yielding `Err`, every subsequent call
/// returns `None`.
///
/// Created by [`LoadOptions::stream`](crate::LoadOptions::stream).
pub struct DocumentStream {
    loader: Loader,
    finished: bool,
}

impl DocumentStream {
    pub(crate) fn new(loader: Loader) -> Self {
        Self {
            loader,
            finished: false,
        }
    }

    /// Current read position, pointing at the start of the next document.
    pub(crate) fn position(&self) -> Position {
        self.loader.position()
    }
}

impl Iterator for DocumentStream {
    type Item = Result<Document, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.loader.at_end() {
            self.finished = true;
            return None;
        }
        match self.loader.read_document() {
            Ok(document) => Some(Ok(document)),
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

impl std::iter::FusedIterator for DocumentStream {}
