//! Interface de terminal do subcomando `poll`: spinner e saída colorida.
//!
//! Usa `indicatif` para o spinner enquanto a sessão de polling roda e
//! `console` para colorir a linha final. O [`PollProgress`] é o único ponto
//! que escreve o resultado no terminal; o cliente só registra eventos de
//! debug via `tracing`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::client::PollError;
use crate::contract::{JobState, PollOutcome};

/// Indicador visual de progresso para uma sessão de polling.
///
/// Exibe um spinner durante a espera e, ao final, uma linha verde (job
/// concluído), amarela (job terminou em `error`) ou vermelha (sessão falhou).
pub struct PollProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para sucesso.
    green: Style,
    // Estilo vermelho para falha da sessão.
    red: Style,
    // Estilo amarelo para job que terminou em erro.
    yellow: Style,
}

impl PollProgress {
    /// Inicia o spinner para uma sessão contra `base_url`.
    pub fn start(base_url: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Polling job at {base_url}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow().bold(),
        }
    }

    /// Finaliza o spinner e imprime o resultado da sessão.
    pub fn finish(&self, result: &Result<PollOutcome, PollError>) {
        self.pb.finish_and_clear();
        println!("{}", self.render(result));
    }

    fn render(&self, result: &Result<PollOutcome, PollError>) -> String {
        match result {
            Ok(PollOutcome {
                result: JobState::Completed,
                attempts,
            }) => format!(
                "  {} Job completed after {attempts} attempt(s)",
                self.green.apply_to("✓")
            ),
            Ok(PollOutcome { result, attempts }) => format!(
                "  {} Job finished with result `{result}` after {attempts} attempt(s)",
                self.yellow.apply_to("!")
            ),
            Err(err) => format!(
                "  {} Polling failed [{}]: {err}",
                self.red.apply_to("✗"),
                err.kind()
            ),
        }
    }
}
