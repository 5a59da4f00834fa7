// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Zenoh-backed publishing.

use crate::lidar::Error;
use crate::pipeline::Transport;
use std::collections::HashMap;
use std::{future::Future, pin::Pin};
use zenoh::bytes::Encoding;
use zenoh::qos::{CongestionControl, Priority};
use zenoh::Session;

/// Publishes encoded messages over a zenoh session.
///
/// Each topic is registered up front with its CDR schema so subscribers
/// can identify the message type from the encoding alone. Publishing on a
/// topic that was not registered fails with [`Error::Transport`].
pub struct ZenohTransport {
    session: Session,
    topics: HashMap<String, Encoding>,
}

impl ZenohTransport {
    /// Wrap a session and register the topic schemas.
    pub fn new(session: Session, topics: &[(&str, &str)]) -> Self {
        let topics = topics
            .iter()
            .map(|(topic, schema)| {
                (
                    topic.to_string(),
                    Encoding::APPLICATION_CDR.with_schema(*schema),
                )
            })
            .collect();
        Self { session, topics }
    }

    /// The underlying zenoh session.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl Transport for ZenohTransport {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>> {
        Box::pin(async move {
            let encoding = self
                .topics
                .get(topic)
                .ok_or_else(|| Error::Transport(format!("unregistered topic: {}", topic)))?;
            self.session
                .put(topic, payload)
                .encoding(encoding.clone())
                .priority(Priority::DataHigh)
                .congestion_control(CongestionControl::Drop)
                .await
                .map_err(|err| Error::Transport(err.to_string()))
        })
    }
}
