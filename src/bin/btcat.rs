// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interactive RFCOMM serial terminal.
//!
//! Usage:
//!   btcat scan [duration_ms]
//!   btcat devices
//!   btcat pair <address>
//!   btcat connect <address>

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rfcomm_link::{
    BluetoothAdapter, Config, ConnectionManager, DeviceScanner, Error, RfcommTransport,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rfcomm_link=info".parse().unwrap()),
        )
        .init();

    let config = Config::load()?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    match command.as_str() {
        "scan" => {
            let duration = match args.next() {
                Some(ms) => Duration::from_millis(ms.parse()?),
                None => config.scan_duration(),
            };

            let adapter = BluetoothAdapter::new().await?;
            if !adapter.is_enabled().await? {
                info!("Adapter is off, powering on");
                adapter.enable().await?;
            }

            let scanner = DeviceScanner::new(&adapter);
            for device in scanner.scan(Some(duration)).await? {
                println!(
                    "{}  {}  paired={}  rssi={}",
                    device.address,
                    device.name,
                    device.paired,
                    device
                        .rssi
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }
        "devices" => {
            let adapter = BluetoothAdapter::new().await?;
            println!("Adapter address: {}", adapter.address().await?);
            for (addr, name) in adapter.paired_devices().await? {
                println!("{}  {}", addr, name);
            }
        }
        "pair" => {
            let address = args.next();
            let Some(address) = address else {
                bail!("usage: btcat pair <address>");
            };
            let adapter = BluetoothAdapter::new().await?;
            adapter.pair(&address).await?;
            println!("Paired with {}", address);
        }
        "connect" => {
            let address = args.next();
            let Some(address) = address else {
                bail!("usage: btcat connect <address>");
            };
            run_terminal(&config, &address).await?;
        }
        _ => {
            eprintln!(
                "usage: btcat <scan [duration_ms] | devices | pair <address> | connect <address>>"
            );
        }
    }

    Ok(())
}

/// Line-oriented terminal: send each stdin line with CRLF, echo the reply
/// up to the next CRLF.
async fn run_terminal(config: &Config, address: &str) -> Result<()> {
    let transport = Arc::new(RfcommTransport::new(config.bluetooth.channel));
    let manager = ConnectionManager::new(transport).with_read_timeout(config.read_timeout());

    manager.connect(address).await?;
    info!("Connected. Type lines to send; Ctrl-C to exit.");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                manager.write(line.as_bytes()).await?;
                manager.write(b"\r\n").await?;

                match manager.read_until(b"\r\n", None).await {
                    Ok(reply) => print!("{}", String::from_utf8_lossy(&reply)),
                    Err(Error::Timeout { elapsed_ms }) => {
                        warn!("No reply within {} ms", elapsed_ms);
                    }
                    Err(e) => {
                        error!("Read failed: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    manager.disconnect().await?;
    Ok(())
}
