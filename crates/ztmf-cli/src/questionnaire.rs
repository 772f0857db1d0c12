//! Interactive questionnaire walk for one system and datacall.

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use ztmf_client::{RequestScope, ZtmfClient};
use ztmf_core::format::{pillar_heading, questionnaire_path, split_camel};
use ztmf_core::model::{AnswerPayload, Datacall, FismaSystem, QuestionOption, QuestionScore};
use ztmf_core::sequence::Sequence;
use ztmf_core::wizard::{Decision, Nav, Step, Wizard};

use crate::ui::{BOLD, CYAN, bold, dim, header, paint, success, warning};

const HELP: &str = "commands: <n> choose option · notes <text> · save · next · back · jump <function-id> · list · quit";

/// Parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Choose(usize),
    Notes(String),
    Save,
    Go(Nav),
    List,
    Quit,
    Help,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    match word.to_lowercase().as_str() {
        "" | "help" | "?" => Input::Help,
        "s" | "save" => Input::Save,
        "n" | "next" => Input::Go(Nav::Next),
        "b" | "back" => Input::Go(Nav::Back),
        "l" | "list" => Input::List,
        "q" | "quit" | "exit" => Input::Quit,
        "notes" => Input::Notes(rest.trim().to_owned()),
        "j" | "jump" => rest
            .trim()
            .parse()
            .map_or_else(|_| Input::Unknown(line.to_owned()), |id| Input::Go(Nav::Jump(id))),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map_or_else(|| Input::Unknown(line.to_owned()), Input::Choose),
    }
}

struct Session<'a> {
    client: &'a ZtmfClient,
    scope: RequestScope,
    system: FismaSystem,
    datacall: Datacall,
    wizard: Wizard,
    saved: Vec<QuestionScore>,
    options: Vec<QuestionOption>,
    lines: Lines<BufReader<Stdin>>,
}

pub async fn run(client: &ZtmfClient, system_id: i64, datacall_id: Option<i64>) -> Result<()> {
    let scope = RequestScope::new();

    let system = scope
        .run(client.fisma_system(system_id))
        .await
        .with_context(|| format!("failed to load system {system_id}"))?;

    let datacall = match datacall_id {
        Some(id) => scope
            .run(client.datacalls())
            .await?
            .into_iter()
            .find(|d| d.datacallid == id)
            .with_context(|| format!("datacall {id} does not exist"))?,
        None => scope
            .run(client.latest_datacall())
            .await?
            .context("no datacalls exist yet")?,
    };

    let questions = scope.run(client.questions(system_id)).await?;
    if questions.is_empty() {
        bail!("system {system_id} has no questions");
    }
    let saved = scope
        .run(client.question_scores(datacall.datacallid, system_id))
        .await?;

    info!(
        system = system_id,
        datacall = datacall.datacallid,
        questions = questions.len(),
        answered = saved.len(),
        "starting questionnaire"
    );

    let mut session = Session {
        client,
        scope,
        system,
        datacall,
        wizard: Wizard::new(Sequence::build(questions)),
        saved,
        options: Vec::new(),
        lines: BufReader::new(tokio::io::stdin()).lines(),
    };
    session.walk().await
}

impl Session<'_> {
    async fn walk(&mut self) -> Result<()> {
        println!();
        header(
            "📋",
            &format!("{} · {}", self.system.fismaacronym, self.datacall.datacall),
        );
        println!("  {}", dim(HELP));
        self.enter().await?;

        loop {
            let Some(line) = self.prompt("›").await? else {
                return Ok(());
            };
            match parse_input(&line) {
                Input::Choose(n) => self.choose(n),
                Input::Notes(text) => {
                    self.wizard.set_notes(&text);
                    println!("  {}", dim("notes updated"));
                }
                Input::Save => {
                    if self.save().await? {
                        return Ok(());
                    }
                }
                Input::Go(Nav::Jump(id)) => match self.wizard.sequence().locate(id) {
                    Ok(_) => self.navigate(Nav::Jump(id)).await?,
                    Err(e) => warning(&e.to_string()),
                },
                Input::Go(nav) => self.navigate(nav).await?,
                Input::List => self.list(),
                Input::Quit => {
                    if self.wizard.is_dirty() {
                        warning("Leaving with unsaved changes.");
                    }
                    return Ok(());
                }
                Input::Help => println!("  {}", dim(HELP)),
                Input::Unknown(text) => warning(&format!("Unrecognised input '{text}'")),
            }
        }
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{} ", paint(&format!("{BOLD}{CYAN}"), label));
        std::io::Write::flush(&mut std::io::stdout()).context("failed to flush stdout")?;
        self.lines.next_line().await.context("failed to read stdin")
    }

    /// Load options and the saved answer for the current step, then render it.
    async fn enter(&mut self) -> Result<()> {
        let Some(function_id) = self.wizard.current() else {
            bail!("questionnaire is empty");
        };
        self.options = self
            .scope
            .run(self.client.function_options(function_id))
            .await
            .with_context(|| format!("failed to load options for function {function_id}"))?;

        let existing = self.saved_answer();
        let (option, notes) = existing.map_or((None, String::new()), |s| {
            (Some(s.functionoptionid), s.notes.clone())
        });
        self.wizard.load_answer(option, &notes);
        self.render(function_id);
        Ok(())
    }

    fn saved_answer(&self) -> Option<&QuestionScore> {
        self.saved.iter().find(|s| {
            self.options
                .iter()
                .any(|o| o.functionoptionid == s.functionoptionid)
        })
    }

    fn render(&self, function_id: i64) {
        let seq = self.wizard.sequence();
        let Some(question) = seq.question(function_id) else {
            return;
        };
        let step = self.wizard.position() + 1;

        println!();
        println!(
            "{}  {}",
            bold(&pillar_heading(&question.pillar.pillar)),
            dim(&format!("{step}/{}", seq.len()))
        );
        println!("  {}", bold(&split_camel(&question.function.function)));
        println!("  {}", question.question);
        println!(
            "  {}",
            dim(&questionnaire_path(
                &self.system.fismaacronym,
                &self.datacall.datacall,
                &question.pillar.pillar,
                &question.function.function,
            ))
        );
        println!();
        for (i, option) in self.options.iter().enumerate() {
            let marker = if self.wizard.selected() == Some(option.functionoptionid) {
                "●"
            } else {
                "○"
            };
            println!(
                "  {marker} {}. {} {}",
                i + 1,
                bold(&option.optionname),
                dim(&format!("({})", option.score))
            );
            println!("       {}", option.description);
        }
        if !question.notesprompt.is_empty() {
            println!();
            println!("  {}", dim(&question.notesprompt));
        }
        if !self.wizard.notes().is_empty() {
            println!("  notes: {}", self.wizard.notes());
        }
    }

    fn choose(&mut self, n: usize) {
        match self.options.get(n - 1) {
            Some(option) => {
                self.wizard.select(option.functionoptionid);
                println!("  selected {}", bold(&option.optionname));
            }
            None => warning(&format!("Choose 1 to {}", self.options.len())),
        }
    }

    fn list(&self) {
        for group in self.wizard.sequence().groups() {
            println!("  {}", bold(&pillar_heading(&group.name)));
            for q in &group.questions {
                let here = self.wizard.current() == Some(q.function_id());
                let line = format!("{:>5}  {}", q.function_id(), split_camel(&q.function.function));
                if here {
                    println!("  {}", paint(CYAN, &format!("▸{line}")));
                } else {
                    println!("   {line}");
                }
            }
        }
    }

    async fn navigate(&mut self, nav: Nav) -> Result<()> {
        match self.wizard.request(nav) {
            Step::Moved(_) => self.enter().await,
            Step::Confirm { .. } => {
                warning("You have unsaved changes on this question.");
                let answer = self.prompt("Discard them? [y/N]").await?.unwrap_or_default();
                let decision = if answer.trim().eq_ignore_ascii_case("y") {
                    Decision::Discard
                } else {
                    Decision::Stay
                };
                match self.wizard.resolve(decision) {
                    Step::Moved(_) => self.enter().await,
                    _ => Ok(()),
                }
            }
            Step::Stay => Ok(()),
            Step::Disabled => {
                let why = match nav {
                    Nav::Next => "Already at the last question.",
                    Nav::Back => "Already at the first question.",
                    Nav::Jump(_) => "That function is not in this questionnaire.",
                };
                warning(why);
                Ok(())
            }
        }
    }

    /// Persist the current answer and advance. Returns true once the last
    /// question has been saved.
    async fn save(&mut self) -> Result<bool> {
        let Some(option) = self.wizard.selected() else {
            warning("Choose an option before saving.");
            return Ok(false);
        };
        let payload = AnswerPayload {
            fismasystemid: self.system.fismasystemid,
            datacallid: self.datacall.datacallid,
            functionoptionid: option,
            notes: self.wizard.notes().to_owned(),
        };
        let scoreid = self.saved_answer().map(|s| s.scoreid);
        let stored = self
            .scope
            .run(self.client.save_answer(scoreid, &payload))
            .await
            .context("failed to save answer")?;
        debug!(scoreid = stored.scoreid, "answer saved");

        let options = &self.options;
        self.saved
            .retain(|s| !options.iter().any(|o| o.functionoptionid == s.functionoptionid));
        self.saved.push(stored);

        let last = !self.wizard.can_go_next();
        match self.wizard.save_and_advance() {
            Step::Moved(_) => {
                success("Saved");
                self.enter().await?;
                Ok(false)
            }
            _ if last => {
                success("Saved. That was the last question.");
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("2"), Input::Choose(2));
        assert_eq!(parse_input("0"), Input::Unknown("0".to_owned()));
        assert_eq!(parse_input("next"), Input::Go(Nav::Next));
        assert_eq!(parse_input(" B "), Input::Go(Nav::Back));
        assert_eq!(parse_input("jump 14"), Input::Go(Nav::Jump(14)));
        assert_eq!(parse_input("notes MFA everywhere"), Input::Notes("MFA everywhere".to_owned()));
        assert_eq!(parse_input("s"), Input::Save);
        assert_eq!(parse_input(""), Input::Help);
        assert_eq!(parse_input("jump x"), Input::Unknown("jump x".to_owned()));
    }
}
