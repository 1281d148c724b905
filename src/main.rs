use anyhow::Context;
use clap::Parser;
use semp_assistant::core::diagnostics::run_diagnostics;
use semp_assistant::core::{ChatModel, ConfigProvider};
use semp_assistant::utils::error::ErrorSeverity;
use semp_assistant::utils::{logger, validation::Validate};
use semp_assistant::{
    build_resolver, Answer, AnswerResolver, AssistantConfig, AssistantError, CliConfig,
    CsvAnswerLog, LocalStorage, OpenAiClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting semp-assistant");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    if cli.show_log {
        return show_log(&config).await;
    }

    if cli.check {
        return check(&config).await;
    }

    let resolver = match build_resolver(&config).await {
        Ok(resolver) => resolver,
        Err(e) => exit_with(&e),
    };

    match &cli.question {
        Some(question) => match resolver.resolve(question).await {
            Ok(answer) => print_answer(&answer, cli.json)?,
            Err(e) => exit_with(&e),
        },
        None => run_interactive(&resolver, &config, cli.json).await?,
    }

    Ok(())
}

async fn run_interactive(
    resolver: &AnswerResolver,
    config: &AssistantConfig,
    json: bool,
) -> anyhow::Result<()> {
    eprintln!("💬 {}: ask a question (Ctrl-D to quit)", config.assistant_name());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match resolver.resolve(&line).await {
            Ok(answer) => print_answer(&answer, json)?,
            Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
        }
    }

    Ok(())
}

fn print_answer(answer: &Answer, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(answer)?);
        return Ok(());
    }

    println!("{}", answer.text);
    if !answer.citations.is_empty() {
        println!("📄 Sources: {}", answer.citations.join(", "));
    }
    println!("🏷️  Source: {}", answer.source);
    Ok(())
}

async fn show_log(config: &AssistantConfig) -> anyhow::Result<()> {
    let storage = LocalStorage::new(config.log_dir().to_string());
    let log = CsvAnswerLog::new(storage, config.log_file());

    let records = match log.read_records().await {
        Ok(records) => records,
        Err(e) => exit_with(&e),
    };

    println!("📁 {}/{} ({} entries)", config.log_dir(), log.file_name(), records.len());
    for record in records {
        println!(
            "{} [{}] {} => {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.source,
            record.question,
            record.answer
        );
    }
    Ok(())
}

async fn check(config: &AssistantConfig) -> anyhow::Result<()> {
    let api_key = config.api_key();
    let client = OpenAiClient::from_config(config).ok();

    let report = run_diagnostics(
        api_key.as_deref(),
        client.as_ref().map(|c| c as &dyn ChatModel),
    )
    .await;

    match (&report.masked_key, &report.probe) {
        (None, _) => println!("❌ OPENAI_API_KEY not found in config or environment."),
        (Some(masked), Some(Ok(reply))) => {
            println!("✅ OPENAI_API_KEY loaded: {} (hidden)", masked);
            println!("✅ Model call succeeded ({}):", config.chat_model());
            println!("{}", reply);
        }
        (Some(masked), Some(Err(message))) => {
            println!("✅ OPENAI_API_KEY loaded: {} (hidden)", masked);
            println!("❌ Model call failed:");
            println!("{}", message);
        }
        (Some(masked), None) => {
            println!("✅ OPENAI_API_KEY loaded: {} (hidden)", masked);
            println!("❌ Could not create a model client for {}", config.llm_endpoint());
        }
    }

    if !report.is_healthy() {
        std::process::exit(1);
    }
    Ok(())
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_with(e: &AssistantError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4, // 輸入錯誤
        ErrorSeverity::Medium => 2, // 可重試
        ErrorSeverity::High => 1, // 資料錯誤
        ErrorSeverity::Critical => 3, // 設定或系統錯誤
    };
    std::process::exit(exit_code);
}
