//! Interface de linha de comando do jobpoll baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, poll) e flags
//! globais (--config, --verbose, --json-logs). As flags de cada subcomando
//! sobrepõem `jobpoll.toml` e as variáveis de ambiente.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::JobpollConfig;

/// jobpoll: polling de um job demorado com backoff exponencial limitado.
#[derive(Debug, Parser)]
#[command(name = "jobpoll", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para um arquivo TOML de configuração (padrão: ./jobpoll.toml, se existir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita logs de debug (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Emite os logs como linhas JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa o servidor HTTP do simulador de jobs.
    Serve(ServeArgs),

    /// Reseta o job e faz polling até ele concluir ou falhar.
    Poll(PollArgs),
}

/// Argumentos de `jobpoll serve`.
#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Interface para o bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Porta para o bind.
    #[arg(long)]
    pub port: Option<u16>,

    /// Milissegundos que o job fica pendente após um reset.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Probabilidade em [0, 1] de o job terminar em erro.
    #[arg(long)]
    pub error_probability: Option<f64>,
}

/// Argumentos de `jobpoll poll`.
#[derive(Debug, Clone, Default, Args)]
pub struct PollArgs {
    /// URL base do simulador de jobs.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Número máximo de requisições de status.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Primeiro intervalo de backoff em milissegundos.
    #[arg(long)]
    pub initial_delay_ms: Option<u64>,

    /// Teto do backoff em milissegundos.
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Orçamento total do polling em milissegundos.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ServeArgs {
    /// Sobrepõe a seção `[simulator]` com as flags informadas.
    pub fn apply(&self, config: &mut JobpollConfig) {
        let sim = &mut config.simulator;
        if let Some(host) = &self.host {
            sim.host = host.clone();
        }
        if let Some(port) = self.port {
            sim.port = port;
        }
        if let Some(delay) = self.delay_ms {
            sim.completion_delay_ms = delay;
        }
        if let Some(probability) = self.error_probability {
            sim.error_probability = probability;
        }
    }
}

impl PollArgs {
    /// Sobrepõe a seção `[client]` com as flags informadas.
    pub fn apply(&self, config: &mut JobpollConfig) {
        let client = &mut config.client;
        if let Some(url) = &self.base_url {
            client.base_url = url.clone();
        }
        if let Some(n) = self.max_attempts {
            client.max_attempts = n;
        }
        if let Some(ms) = self.initial_delay_ms {
            client.initial_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            client.max_delay_ms = ms;
        }
        if let Some(ms) = self.timeout_ms {
            client.timeout_ms = ms;
        }
    }
}
