// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
//
// ```bash
// $ cargo r --release --features=parallel --example par_build
// ```
use std::time::Instant;

use riverodds_eval::LookupTable;

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let num_tasks = std::thread::available_parallelism().map_or(4, |n| n.get());

    let now = Instant::now();
    let table = LookupTable::par_build(num_tasks);

    println!("Tasks:    {num_tasks}");
    println!("Entries:  {}", table.len());
    println!("Classes:  {}", table.classes());
    println!("Elapsed:  {:.3}s", now.elapsed().as_secs_f64());
}
