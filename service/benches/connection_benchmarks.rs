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

//! Benchmarks for the connection runtime over in-memory streams

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use telwire_service::{ConnectionConfig, DataFn, Handlers, TelnetConnection, TelnetWriter};
use telwire_telnetcodec::TelnetOption;
use telwire_telnetcodec::consts::{DO, IAC, WILL};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

fn counting_handlers() -> (Handlers, mpsc::UnboundedReceiver<usize>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handlers = Handlers::new().with_data(DataFn::new(move |_writer: TelnetWriter, data: Bytes| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(data.len());
        }
    }));
    (handlers, rx)
}

fn bench_data_throughput(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("data_throughput");

    for size in [1024usize, 16 * 1024, 256 * 1024] {
        let payload = vec![b'x'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.to_async(&rt).iter(|| async {
                let (stream, mut peer) = duplex(64 * 1024);
                let (handlers, mut lengths) = counting_handlers();
                let conn = TelnetConnection::new(stream, ConnectionConfig::default(), handlers);
                conn.run().unwrap();

                peer.write_all(payload).await.unwrap();
                let mut received = 0;
                while received < payload.len() {
                    received += lengths.recv().await.unwrap();
                }

                conn.close().await;
                black_box(received)
            });
        });
    }

    group.finish();
}

fn bench_negotiation_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("negotiation");

    group.bench_function("two_server_one_client", |b| {
        b.to_async(&rt).iter(|| async {
            let (stream, mut peer) = duplex(1024);
            let config = ConnectionConfig::default()
                .with_server_options([TelnetOption::ECHO, TelnetOption::SGA])
                .with_client_options([TelnetOption::NAWS]);
            let conn = TelnetConnection::new(stream, config, Handlers::new());
            conn.run().unwrap();

            let negotiating = tokio::spawn({
                let conn = conn.clone();
                async move { conn.start_negotiation().await }
            });
            let mut offers = [0u8; 9];
            peer.read_exact(&mut offers).await.unwrap();
            peer.write_all(&[IAC, DO, 1, IAC, DO, 3, IAC, WILL, 31])
                .await
                .unwrap();
            negotiating.await.unwrap().unwrap();

            conn.close().await;
            black_box(conn.is_negotiated())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_data_throughput, bench_negotiation_round_trip);
criterion_main!(benches);
