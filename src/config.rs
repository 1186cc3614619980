//! Configuração do jobpoll carregada a partir de `jobpoll.toml`.
//!
//! A struct [`JobpollConfig`] agrupa as seções `[client]` e `[simulator]`.
//! Valores ausentes no arquivo usam defaults sensíveis. Variáveis de ambiente
//! têm precedência sobre o arquivo: `PORT`, `COMPLETION_DELAY` (ms) e
//! `ERROR_PROBABILITY` para o simulador, `JOBPOLL_BASE_URL` para o cliente.
//! Flags da CLI são aplicadas depois, e só então cada subcomando valida a
//! seção que usa.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::client::PollConfig;
use crate::error::JobpollError;
use crate::simulator::SimulatorConfig;

/// Nome do arquivo procurado no diretório atual quando `--config` não é usado.
pub const DEFAULT_CONFIG_FILE: &str = "jobpoll.toml";

/// Configuração de nível superior carregada de `jobpoll.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobpollConfig {
    /// Parâmetros do cliente de polling (`jobpoll poll`).
    #[serde(default)]
    pub client: ClientSettings,

    /// Parâmetros do simulador de jobs (`jobpoll serve`).
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

/// Seção `[client]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSettings {
    /// URL base do simulador.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Máximo de requisições de status por sessão.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Primeiro intervalo de backoff, em milissegundos.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Teto do backoff exponencial, em milissegundos.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Orçamento total do loop de polling, em milissegundos.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Limite de cada requisição HTTP individual, em milissegundos.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Seção `[simulator]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulatorSettings {
    /// Interface em que o servidor escuta.
    #[serde(default = "default_host")]
    pub host: String,

    /// Porta em que o servidor escuta.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tempo que um job fica pendente após um reset, em milissegundos.
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,

    /// Probabilidade em `[0, 1]` de o job terminar em `error`.
    #[serde(default = "default_error_probability")]
    pub error_probability: f64,
}

// Os defaults do cliente vêm de `PollConfig::default()`.
fn default_base_url() -> String {
    PollConfig::default().base_url
}

fn default_max_attempts() -> u32 {
    PollConfig::default().max_attempts
}

fn default_initial_delay_ms() -> u64 {
    PollConfig::default().initial_delay.as_millis() as u64
}

fn default_max_delay_ms() -> u64 {
    PollConfig::default().max_delay.as_millis() as u64
}

fn default_timeout_ms() -> u64 {
    PollConfig::default().timeout.as_millis() as u64
}

fn default_request_timeout_ms() -> u64 {
    PollConfig::default().request_timeout.as_millis() as u64
}

// Escuta apenas em loopback por padrão.
fn default_host() -> String {
    "127.0.0.1".to_string()
}

// Mesma porta padrão do cliente (`http://localhost:3000`).
fn default_port() -> u16 {
    3000
}

// Os defaults do simulador vêm de `SimulatorConfig::default()`.
fn default_completion_delay_ms() -> u64 {
    SimulatorConfig::default().delay.as_millis() as u64
}

fn default_error_probability() -> f64 {
    SimulatorConfig::default().error_probability
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            completion_delay_ms: default_completion_delay_ms(),
            error_probability: default_error_probability(),
        }
    }
}

impl ClientSettings {
    /// Converte a seção para a configuração de runtime do cliente.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            base_url: self.base_url.clone(),
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// Rejeita parâmetros com os quais o protocolo de polling não roda.
    pub fn validate(&self) -> Result<(), JobpollError> {
        if self.max_attempts == 0 {
            return Err(config_error("client.max_attempts must be at least 1"));
        }
        if self.initial_delay_ms == 0 || self.max_delay_ms == 0 {
            return Err(config_error("client delays must be positive"));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(config_error(
                "client.max_delay_ms must not be below client.initial_delay_ms",
            ));
        }
        if self.timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(config_error("client timeouts must be positive"));
        }
        Ok(())
    }
}

impl SimulatorSettings {
    /// Converte a seção para a configuração de runtime do simulador.
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            delay: Duration::from_millis(self.completion_delay_ms),
            error_probability: self.error_probability,
        }
    }

    /// Endereço `host:porta` para o bind do servidor.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejeita uma probabilidade fora de `[0, 1]` (inclusive `NaN`).
    pub fn validate(&self) -> Result<(), JobpollError> {
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(config_error(
                "simulator.error_probability must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl JobpollConfig {
    /// Carrega de `path` (que precisa existir) ou, quando `None`, de
    /// `jobpoll.toml` se presente, e aplica as variáveis de ambiente.
    ///
    /// Não valida: cada subcomando valida a sua seção depois de aplicar as
    /// flags da CLI.
    pub fn load_from(path: Option<&Path>) -> Result<Self, JobpollError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, JobpollError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<JobpollConfig>(&contents)?)
    }

    /// Sobrepõe variáveis de ambiente, consultadas através de `lookup`.
    /// Valores vazios são ignorados; valores inválidos são erro.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), JobpollError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = var("JOBPOLL_BASE_URL") {
            self.client.base_url = url;
        }
        if let Some(port) = var("PORT") {
            self.simulator.port = parse_env("PORT", &port)?;
        }
        if let Some(delay) = var("COMPLETION_DELAY") {
            self.simulator.completion_delay_ms = parse_env("COMPLETION_DELAY", &delay)?;
        }
        if let Some(probability) = var("ERROR_PROBABILITY") {
            self.simulator.error_probability = parse_env("ERROR_PROBABILITY", &probability)?;
        }
        Ok(())
    }

    /// Valida as duas seções.
    pub fn validate(&self) -> Result<(), JobpollError> {
        self.client.validate()?;
        self.simulator.validate()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, JobpollError> {
    value
        .trim()
        .parse()
        .map_err(|_| JobpollError::Config(format!("invalid value for {key}: {value:?}")))
}

fn config_error(message: &str) -> JobpollError {
    JobpollError::Config(message.to_string())
}
