// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `mqttbench publisher` command - Publish generated sensor readings.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use mqttbench_core::{
    BenchResult, Codec, CodecRegistry, ConfigLoader, Encoding, HardValidationError, MqttSession, MqttSettings,
    PayloadSize, Port, PublishRun, PublishSummary, PublisherSettings, QosLevel, SensorId,
};

#[derive(Args, Debug)]
pub struct PublisherArgs {
    /// Broker host (falls back to the config file)
    #[arg(long)]
    pub broker: Option<String>,

    /// Broker port (falls back to the config file)
    #[arg(long)]
    pub port: Option<u16>,

    /// Topic to publish to
    #[arg(long, default_value = "mqtt-demo/all")]
    pub topic: String,

    /// Sensor id stamped on every reading
    #[arg(long, default_value = "sensor_001")]
    pub sensor_id: String,

    /// Number of messages to publish
    #[arg(long, default_value_t = 10)]
    pub count: u32,

    /// Seconds to sleep between messages
    #[arg(long, default_value_t = 1.0)]
    pub interval: f64,

    /// Payload size: small, medium or large
    #[arg(long, default_value = "small")]
    pub payload: String,

    /// MQTT QoS level: 0, 1 or 2
    #[arg(long, default_value_t = 1)]
    pub qos: u8,

    /// Wire encoding: json, msgpack, cbor or protobuf
    #[arg(long, default_value = "json")]
    pub encoding: String,
}

impl PublisherArgs {
    /// Validate every flag before any config, network or generation work.
    fn validate(&self) -> BenchResult<(Arc<dyn Codec>, PublisherSettings, Option<Port>)> {
        let codec = CodecRegistry::standard().resolve(&self.encoding)?;
        let payload: PayloadSize = self.payload.parse()?;
        let qos = QosLevel::try_from(self.qos)?;
        let sensor_id = SensorId::new(self.sensor_id.as_str())?;
        let port = self.port.map(Port::new).transpose()?;

        let interval = Duration::try_from_secs_f64(self.interval).map_err(|_| {
            HardValidationError::InvalidFieldValue {
                field: "interval",
                value: self.interval.to_string(),
                reason: "Interval must be a non-negative number of seconds".to_string(),
            }
        })?;

        let settings = PublisherSettings {
            topic: self.topic.clone(),
            sensor_id,
            count: self.count,
            interval,
            payload,
            qos,
        };
        Ok((codec, settings, port))
    }
}

pub async fn execute(
    config_path: Option<&Path>,
    args: PublisherArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (codec, run, port) = args.validate()?;
    let encoding = codec.encoding();
    let config = ConfigLoader::load_or_default(config_path)?;
    let settings = MqttSettings::from_config(&config.broker, "pub").with_endpoint(args.broker, port);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              MQTTBENCH PUBLISHER                             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("  Broker:    {}", settings.broker_addr());
    println!("  Topic:     {}", run.topic);
    println!("  Encoding:  {}", encoding);
    println!("  Payload:   {}", run.payload);
    println!("  QoS:       {}", run.qos);
    println!("  Messages:  {} every {:.3}s", run.count, run.interval.as_secs_f64());
    println!();

    let session = MqttSession::connect(&settings).await?;
    if config.publisher.connect_settle_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.publisher.connect_settle_ms)).await;
    }

    let publisher = session.into_publisher();

    let summary = match PublishRun::new(&publisher, codec.as_ref())
        .execute(&run)
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Publisher stopped");
            return Err(e.into());
        }
    };

    publisher.finish().await?;
    print_summary(encoding, &summary);
    Ok(())
}

fn print_summary(encoding: Encoding, summary: &PublishSummary) {
    println!();
    println!("Publisher summary ({}):", encoding);
    println!("  Messages sent:     {}", summary.messages);
    println!(
        "  Total bytes:       {} (avg {:.1} bytes/msg)",
        summary.total_bytes,
        summary.avg_message_bytes()
    );
    println!(
        "  Encode time:       avg {:.4}ms  min {:.4}ms  max {:.4}ms  p99 {:.4}ms",
        summary.avg_encode_ms(),
        summary.encode.min,
        summary.encode.max,
        summary.encode.p99
    );
    println!(
        "  Publish hand-off:  avg {:.4}ms  p99 {:.4}ms",
        summary.publish.mean, summary.publish.p99
    );
    println!(
        "  Throughput:        {:.2} msgs/sec over {:.2}s",
        summary.messages_per_sec(),
        summary.elapsed.as_secs_f64()
    );
}
