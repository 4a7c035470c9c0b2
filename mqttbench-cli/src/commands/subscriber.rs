// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `mqttbench subscriber` command - Receive readings and measure latency.
//!
//! Messages are decoded inline in the task that polls the event loop. Runs
//! until Ctrl+C, a broker disconnect, or `--max-messages` arrivals.

use std::path::Path;
use std::sync::Arc;

use clap::Args;

use mqttbench_core::{
    BenchResult, Codec, CodecRegistry, ConfigLoader, Encoding, MqttSession, MqttSettings, Port,
    QosLevel, SubscriberState, SubscriberSummary,
};

#[derive(Args, Debug)]
pub struct SubscriberArgs {
    /// Broker host (falls back to the config file)
    #[arg(long)]
    pub broker: Option<String>,

    /// Broker port (falls back to the config file)
    #[arg(long)]
    pub port: Option<u16>,

    /// Topic filter to subscribe to
    #[arg(long, default_value = "mqtt-demo/all")]
    pub topic: String,

    /// MQTT QoS level: 0, 1 or 2
    #[arg(long, default_value_t = 1)]
    pub qos: u8,

    /// Wire encoding: json, msgpack, cbor or protobuf
    #[arg(long, default_value = "json")]
    pub encoding: String,

    /// Stop after this many messages (including undecodable ones)
    #[arg(long)]
    pub max_messages: Option<u64>,
}

impl SubscriberArgs {
    fn validate(&self) -> BenchResult<(Arc<dyn Codec>, QosLevel, Option<Port>)> {
        let codec = CodecRegistry::standard().resolve(&self.encoding)?;
        let qos = QosLevel::try_from(self.qos)?;
        let port = self.port.map(Port::new).transpose()?;
        Ok((codec, qos, port))
    }
}

/// Why the receive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Interrupted,
    BrokerClosed,
    LimitReached,
}

fn limit_reached(state: &SubscriberState, max_messages: Option<u64>) -> bool {
    max_messages.is_some_and(|max| state.received() + state.decode_failures() >= max)
}

pub async fn execute(
    config_path: Option<&Path>,
    args: SubscriberArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (codec, qos, port) = args.validate()?;
    let encoding = codec.encoding();
    let config = ConfigLoader::load_or_default(config_path)?;
    let settings = MqttSettings::from_config(&config.broker, "sub").with_endpoint(args.broker, port);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              MQTTBENCH SUBSCRIBER                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("  Broker:    {}", settings.broker_addr());
    println!("  Topic:     {}", args.topic);
    println!("  Encoding:  {}", encoding);
    println!("  QoS:       {}", qos);
    println!();

    let mut session = MqttSession::connect(&settings).await?;
    session.subscribe(&args.topic, qos).await?;

    let mut state = SubscriberState::new(
        codec,
        config.subscriber.sample_capacity,
        config.subscriber.overflow_policy,
    );

    if args.max_messages == Some(0) {
        session.disconnect().await;
        print_summary(encoding, &state.summary(), StopReason::LimitReached);
        return Ok(());
    }

    println!("Waiting for messages. Press Ctrl+C to stop...");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break Ok(StopReason::Interrupted),
            incoming = session.next_message() => match incoming {
                Ok(Some(message)) => {
                    state.handle(&message.topic, &message.payload);
                    if limit_reached(&state, args.max_messages) {
                        break Ok(StopReason::LimitReached);
                    }
                }
                Ok(None) => break Ok(StopReason::BrokerClosed),
                Err(e) => break Err(e),
            },
        }
    };

    match outcome {
        Ok(reason) => {
            if reason != StopReason::BrokerClosed {
                session.disconnect().await;
            }
            print_summary(encoding, &state.summary(), reason);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Subscriber stopped");
            print_summary(encoding, &state.summary(), StopReason::BrokerClosed);
            Err(e.into())
        }
    }
}

fn print_summary(encoding: Encoding, summary: &SubscriberSummary, reason: StopReason) {
    println!();
    match reason {
        StopReason::Interrupted => println!("Interrupted."),
        StopReason::BrokerClosed => println!("Connection to broker closed."),
        StopReason::LimitReached => println!("Message limit reached."),
    }
    println!("Subscriber summary ({}):", encoding);
    println!("  Messages received: {}", summary.received);
    println!("  Decode failures:   {}", summary.decode_failures);
    println!("  Total bytes:       {}", summary.total_bytes);

    match summary.avg_latency_ms() {
        Some(avg) => {
            println!(
                "  Latency:           avg {:.3}ms  min {:.3}ms  max {:.3}ms",
                avg, summary.latency.min, summary.latency.max
            );
            println!(
                "                     p50 {:.3}ms  p95 {:.3}ms  p99 {:.3}ms",
                summary.latency.p50, summary.latency.p95, summary.latency.p99
            );
            println!(
                "  Decode time:       avg {:.4}ms  p99 {:.4}ms",
                summary.decode.mean, summary.decode.p99
            );
            println!(
                "  Throughput:        {:.2} msgs/sec",
                summary.messages_per_sec()
            );
        }
        None => println!("  Latency:           n/a (no messages decoded)"),
    }

    if summary.latency.dropped > 0 {
        println!(
            "  Samples dropped:   {} (buffer holds {})",
            summary.latency.dropped, summary.latency.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqttbench_core::{BenchError, OverflowPolicy};

    fn args() -> SubscriberArgs {
        SubscriberArgs {
            broker: None,
            port: None,
            topic: "mqtt-demo/all".to_string(),
            qos: 1,
            encoding: "json".to_string(),
            max_messages: None,
        }
    }

    #[test]
    fn test_validate() {
        let (codec, qos, port) = args().validate().unwrap();
        assert_eq!(codec.encoding(), Encoding::Json);
        assert_eq!(qos, QosLevel::AtLeastOnce);
        assert!(port.is_none());

        let mut a = args();
        a.encoding = "MsgPack".to_string();
        assert_eq!(a.validate().unwrap().0.encoding(), Encoding::MsgPack);

        for encoding in Encoding::ALL {
            let mut a = args();
            a.encoding = encoding.as_str().to_string();
            assert_eq!(a.validate().unwrap().0.encoding(), encoding);
        }
    }

    #[test]
    fn test_unknown_encoding_fails_fast() {
        let mut a = args();
        a.encoding = "yaml".to_string();
        assert!(matches!(
            a.validate(),
            Err(BenchError::UnsupportedEncoding { .. })
        ));
    }

    #[test]
    fn test_limit_counts_failures() {
        let mut state = SubscriberState::new(
            CodecRegistry::standard().get(Encoding::Json).unwrap(),
            10,
            OverflowPolicy::DropOldest,
        );
        assert!(!limit_reached(&state, Some(2)));
        state.handle("t", b"garbage");
        assert!(!limit_reached(&state, Some(2)));
        state.handle("t", b"{}");
        assert!(limit_reached(&state, Some(2)));
        assert!(!limit_reached(&state, None));
    }
}
