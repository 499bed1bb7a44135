//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Unit tests for configuration types

use std::time::Duration;
use telwire_service::{ConnectionConfig, Handlers, ServerConfig, TelnetError, TelnetServer};
use telwire_telnetcodec::TelnetOption;

#[test]
fn test_connection_config_defaults() {
    let config = ConnectionConfig::default();

    assert!(config.server_options.is_empty());
    assert!(config.client_options.is_empty());
    assert_eq!(config.negotiation_timeout, Duration::from_secs(10));
    assert_eq!(config.write_queue_capacity, 64);
    assert_eq!(config.read_buffer_size, 256);
    assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
}

#[test]
fn test_connection_config_builder() {
    let config = ConnectionConfig::new()
        .with_server_options([TelnetOption::ECHO, TelnetOption::SGA])
        .with_client_options([TelnetOption::NAWS, TelnetOption::TTYPE])
        .with_negotiation_timeout(Duration::from_secs(3))
        .with_write_queue_capacity(8)
        .with_read_buffer_size(1024)
        .with_shutdown_timeout(Duration::from_millis(250));

    assert_eq!(config.server_options.len(), 2);
    assert!(config.client_options.contains(&TelnetOption::NAWS));
    assert_eq!(config.negotiation_timeout, Duration::from_secs(3));
    assert_eq!(config.write_queue_capacity, 8);
    assert_eq!(config.read_buffer_size, 1024);
    assert_eq!(config.shutdown_timeout, Duration::from_millis(250));
    assert!(config.validate().is_ok());
}

#[test]
fn test_option_sets_accept_raw_codes() {
    let config = ConnectionConfig::new().with_server_options([1u8, 3, 1]);

    assert_eq!(
        config.server_options.iter().map(|o| o.to_u8()).collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[test]
fn test_validation_messages() {
    let config = ConnectionConfig::new().with_write_queue_capacity(0);
    assert_eq!(
        config.validate().unwrap_err(),
        "write_queue_capacity must be greater than 0"
    );

    let config = ServerConfig::default().with_max_connections(0);
    assert_eq!(
        config.validate().unwrap_err(),
        "max_connections must be greater than 0"
    );
}

#[test]
fn test_server_config_carries_connection_settings() {
    let connection = ConnectionConfig::new().with_client_options([TelnetOption::BINARY]);
    let config = ServerConfig::new("0.0.0.0:2323".parse().unwrap())
        .with_max_connections(10)
        .with_connection(connection);

    assert_eq!(config.bind_address.port(), 2323);
    assert_eq!(config.max_connections, 10);
    assert!(
        config
            .connection_config()
            .client_options
            .contains(&TelnetOption::BINARY)
    );
}

#[tokio::test]
async fn test_bind_validates_config() {
    let config = ServerConfig::new("127.0.0.1:0".parse().unwrap())
        .with_negotiation_timeout(Duration::ZERO);

    let result = TelnetServer::bind(config, Handlers::new()).await;
    assert!(matches!(result, Err(TelnetError::InvalidConfig(message)) if message.contains("negotiation_timeout")));
}
