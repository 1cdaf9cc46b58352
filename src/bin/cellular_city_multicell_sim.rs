//! 多小区城市蜂窝仿真
//!
//! 基站按网格铺满正方形城市，终端接入参考信号最强的小区。

use std::process::ExitCode;

use cellsim_rs::scenario::{self, ScenarioOptions};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tracing::error;

#[derive(Debug, Parser)]
#[command(
    name = "cellular_city_multicell_sim",
    about = "多小区 4G/5G 城市仿真：网格基站，最强信号接入，UDP 上行到远端主机"
)]
struct Args {
    /// 终端数量
    #[arg(long = "nUes", default_value_t = 100)]
    n_ues: u32,
    /// 基站数量
    #[arg(long = "nEnbs", default_value_t = 4)]
    n_enbs: u16,
    /// 仿真时长（秒）
    #[arg(long = "simTime", default_value_t = 60.0)]
    sim_time: f64,
    /// 4g 或 5g
    #[arg(long, default_value = "4g")]
    tech: String,
    /// 输出 INFO 日志；接受 true/false、1/0
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    verbose: bool,
    /// 城市边长（米）
    #[arg(long = "areaSize", default_value_t = 2000.0)]
    area_size: f64,
    /// 每个终端的发包间隔（秒）；终端很多时总负载会非常大
    #[arg(long = "packetInterval", default_value_t = 0.02)]
    packet_interval: f64,
    /// 随机数种子
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if args.verbose { "info" } else { "warn" })
            }),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let options = ScenarioOptions {
        n_ues: args.n_ues,
        n_enbs: args.n_enbs,
        sim_time: args.sim_time,
        tech: args.tech,
        verbose: args.verbose,
        area_size: args.area_size,
        packet_interval: args.packet_interval,
        seed: args.seed,
        ..ScenarioOptions::multi_cell()
    };

    match scenario::run(&options) {
        Ok(outcome) => {
            print!("{}", outcome.report());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "仿真失败");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
