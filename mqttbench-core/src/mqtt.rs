// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thin session wrapper over the `rumqttc` MQTT 3.1.1 client.
//!
//! Only connect, publish, subscribe, receive and disconnect are exposed.
//! Session state, QoS handshakes and keep-alive stay inside `rumqttc`.
//! Nothing here retries: the first connection error ends the session.

use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet,
    SubscribeReasonCode,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::BrokerConfig;
use crate::error::ConnectionError;
use crate::publisher::Transport;
use crate::types::{Port, QosLevel};

/// Connection parameters for one client.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: Port,
    pub client_id: String,
    pub keep_alive: Duration,
    pub clean_session: bool,
    pub request_capacity: usize,
    pub max_packet_bytes: usize,
}

impl MqttSettings {
    /// Settings from the broker config section with a unique client id for `role`.
    pub fn from_config(broker: &BrokerConfig, role: &str) -> Self {
        Self {
            host: broker.host.clone(),
            port: broker.port,
            client_id: client_id(role),
            keep_alive: Duration::from_secs(broker.keep_alive_secs),
            clean_session: broker.clean_session,
            request_capacity: broker.request_capacity,
            max_packet_bytes: broker.max_packet_bytes,
        }
    }

    /// Override host and port (command-line flags win over the config file).
    pub fn with_endpoint(mut self, host: Option<String>, port: Option<Port>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// `host:port` for log and error messages.
    pub fn broker_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port.value());
        options
            .set_keep_alive(self.keep_alive)
            .set_clean_session(self.clean_session)
            .set_max_packet_size(self.max_packet_bytes, self.max_packet_bytes);
        options
    }
}

/// `mqttbench-<role>-<8 hex chars>`, unique per process run.
pub fn client_id(role: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("mqttbench-{}-{}", role, &suffix[..8])
}

/// A received application message.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// A connected client that drives its own event loop.
pub struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
    broker: String,
}

impl MqttSession {
    /// Connect and wait for the broker's CONNACK.
    pub async fn connect(settings: &MqttSettings) -> Result<Self, ConnectionError> {
        let broker = settings.broker_addr();
        let (client, mut eventloop) =
            AsyncClient::new(settings.options(), settings.request_capacity);

        tracing::debug!(broker = %broker, client_id = %settings.client_id, "Connecting");

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                    if connack.code == ConnectReturnCode::Success {
                        tracing::info!(
                            broker = %broker,
                            client_id = %settings.client_id,
                            session_present = connack.session_present,
                            "Connected to broker"
                        );
                        break;
                    }
                    return Err(ConnectionError::Refused {
                        broker,
                        code: format!("{:?}", connack.code),
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    return Err(ConnectionError::ConnectFailed {
                        broker,
                        reason: e.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            client,
            eventloop,
            broker,
        })
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }

    /// Queue a SUBSCRIBE. The SUBACK is checked by [`MqttSession::next_message`].
    pub async fn subscribe(&self, topic: &str, qos: QosLevel) -> Result<(), ConnectionError> {
        self.client
            .subscribe(topic, qos.into())
            .await
            .map_err(|e| ConnectionError::SubscribeFailed {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    /// Drive the event loop until the next application message arrives.
    ///
    /// Returns `Ok(None)` when the broker closes the session.
    pub async fn next_message(&mut self) -> Result<Option<IncomingMessage>, ConnectionError> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return Ok(Some(IncomingMessage {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    }));
                }
                Ok(Event::Incoming(Packet::SubAck(suback))) => {
                    if suback
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        return Err(ConnectionError::SubscribeFailed {
                            topic: format!("pkid {}", suback.pkid),
                            reason: "broker rejected subscription".to_string(),
                        });
                    }
                    tracing::info!(codes = ?suback.return_codes, "Subscription acknowledged");
                }
                Ok(Event::Incoming(Packet::Disconnect)) => return Ok(None),
                Ok(_) => {}
                Err(e) => {
                    return Err(ConnectionError::Lost {
                        reason: e.to_string(),
                    })
                }
            }
        }
    }

    /// Send DISCONNECT and let the event loop flush it.
    pub async fn disconnect(mut self) {
        if self.client.disconnect().await.is_err() {
            return;
        }
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        tracing::debug!(broker = %self.broker, "Disconnected");
    }

    /// Hand the event loop to a background task and return a publish handle.
    pub fn into_publisher(self) -> MqttPublisher {
        let (failure_tx, failure_rx) = watch::channel(None);
        let MqttSession {
            client,
            mut eventloop,
            broker,
        } = self;

        let driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "MQTT event loop stopped");
                        let _ = failure_tx.send(Some(e.to_string()));
                        break;
                    }
                }
            }
        });

        MqttPublisher {
            client,
            broker,
            failure: failure_rx,
            driver,
        }
    }
}

/// Publish handle whose event loop runs on a spawned task.
pub struct MqttPublisher {
    client: AsyncClient,
    broker: String,
    failure: watch::Receiver<Option<String>>,
    driver: JoinHandle<()>,
}

impl MqttPublisher {
    pub fn broker(&self) -> &str {
        &self.broker
    }

    /// Queue DISCONNECT behind any pending publishes and wait for the event loop to exit.
    ///
    /// Fails if the connection dropped at any point, including while the
    /// queued publishes were being flushed.
    pub async fn finish(mut self) -> Result<(), ConnectionError> {
        self.check_alive()?;
        self.client
            .disconnect()
            .await
            .map_err(|e| ConnectionError::Lost {
                reason: e.to_string(),
            })?;
        (&mut self.driver).await.map_err(|e| ConnectionError::Lost {
            reason: e.to_string(),
        })?;
        self.check_alive()?;
        tracing::debug!(broker = %self.broker, "Disconnected");
        Ok(())
    }

    fn check_alive(&self) -> Result<(), ConnectionError> {
        let failure = self.failure.borrow().clone();
        match failure {
            Some(reason) => Err(ConnectionError::Lost { reason }),
            None => Ok(()),
        }
    }
}

impl Transport for MqttPublisher {
    async fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        payload: Vec<u8>,
    ) -> Result<(), ConnectionError> {
        self.check_alive()?;
        self.client
            .publish(topic, qos.into(), false, payload)
            .await
            .map_err(|e| ConnectionError::PublishFailed {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}
