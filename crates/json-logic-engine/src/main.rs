//! 规则求值命令行工具
//!
//! 对数据上下文求值一条规则，并将结果以 JSON 输出到 stdout。

use anyhow::{bail, Context, Result};
use clap::Parser;
use json_logic::{rule_depth, JsonLogic};
use json_logic_shared::config::AppConfig;
use json_logic_shared::observability;
use serde_json::Value;
use std::fs;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "json-logic", author, version, about, long_about = None)]
struct Cli {
    /// 规则：JSON 文本，或 @path 从文件读取
    #[arg(short, long)]
    rule: String,

    /// 数据上下文：JSON 文本，或 @path 从文件读取
    #[arg(short, long, default_value = "null")]
    data: String,

    /// 格式化输出
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load("json-logic").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    observability::init(&config.service_name, &config.observability)?;

    let rule = read_json(&cli.rule).context("无法解析规则")?;
    let data = read_json(&cli.data).context("无法解析数据上下文")?;

    let depth = rule_depth(&rule);
    if depth > config.engine.max_rule_depth {
        bail!(
            "规则嵌套深度 {} 超过上限 {}",
            depth,
            config.engine.max_rule_depth
        );
    }
    debug!(depth, "规则已加载");

    let result = JsonLogic::new().evaluate(&rule, &data)?;
    info!("规则求值完成");

    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);
    Ok(())
}

/// 读取内联 JSON 或 `@path` 指向的文件
fn read_json(arg: &str) -> Result<Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("无法读取文件: {}", path))?,
        None => arg.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}
