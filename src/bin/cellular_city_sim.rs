//! 单小区城市蜂窝仿真
//!
//! 一个基站位于城市中心，所有终端接入它，各自向远端主机发 UDP 包。

use std::process::ExitCode;

use cellsim_rs::scenario::{self, ScenarioOptions};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tracing::error;

#[derive(Debug, Parser)]
#[command(
    name = "cellular_city_sim",
    about = "单小区 4G/5G 城市仿真：终端随机游走，UDP 上行到远端主机"
)]
struct Args {
    /// 终端数量
    #[arg(long = "nUes", default_value_t = 50)]
    n_ues: u32,
    /// 仿真时长（秒）
    #[arg(long = "simTime", default_value_t = 30.0)]
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
    /// 每个终端的发包间隔（秒）
    #[arg(long = "packetInterval", default_value_t = 0.1)]
    packet_interval: f64,
    /// 随机数种子
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // 初始化 tracing；报告走 stdout，日志走 stderr
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
        sim_time: args.sim_time,
        tech: args.tech,
        verbose: args.verbose,
        packet_interval: args.packet_interval,
        seed: args.seed,
        ..ScenarioOptions::single_cell()
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
