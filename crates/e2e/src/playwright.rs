//! Playwright browser automation
//!
//! A single `node` process hosts the browser for the whole suite. Rust sends
//! one JSON command per line on its stdin and reads one JSON reply per line
//! from its stdout, so page state survives between page-object calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::driver::{Driver, WaitState};
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Default timeout for actions and waits
    pub timeout: Duration,

    /// Directory `node` runs in; `playwright` must be resolvable from here
    pub node_project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            timeout: Duration::from_secs(5),
            node_project_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum DriverCommand<'a> {
    NewPage,
    Goto { url: &'a str },
    Click { selector: &'a str },
    Fill { selector: &'a str, value: &'a str },
    SelectOption { selector: &'a str, value: &'a str },
    InnerText { selector: &'a str },
    AllInnerTexts { selector: &'a str },
    WaitFor { selector: &'a str, state: WaitState },
    Reload,
    Screenshot { path: &'a Path },
    Close,
}

#[derive(Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a DriverCommand<'a>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

struct Channel {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    child: Mutex<Child>,
    channel: Mutex<Channel>,
}

impl PlaywrightHandle {
    /// Launch the browser and wait for the driver to report ready
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed(&config.node_project_dir).await?;

        info!(
            "Launching {} (headless: {})",
            config.browser.as_str(),
            config.headless
        );

        let mut child = Command::new("node")
            .arg("-e")
            .arg(build_driver_script(&config))
            .current_dir(&config.node_project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(E2eError::DriverClosed)?;
        let stdout = child.stdout.take().ok_or(E2eError::DriverClosed)?;

        let handle = Self {
            child: Mutex::new(child),
            channel: Mutex::new(Channel {
                stdin,
                stdout: BufReader::new(stdout).lines(),
                next_id: 1,
            }),
        };

        // The script announces a launched browser with reply id 0
        {
            let mut channel = handle.channel.lock().await;
            let ready = read_reply(&mut channel.stdout).await?;
            if ready.id != 0 || !ready.ok {
                return Err(E2eError::Playwright(
                    ready.error.unwrap_or_else(|| "browser failed to launch".to_string()),
                ));
            }
        }

        Ok(handle)
    }

    async fn check_playwright_installed(dir: &Path) -> E2eResult<()> {
        let status = Command::new("node")
            .args(["-e", "require.resolve('playwright')"])
            .current_dir(dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn send(&self, command: DriverCommand<'_>) -> E2eResult<serde_json::Value> {
        let mut channel = self.channel.lock().await;
        let id = channel.next_id;
        channel.next_id += 1;

        debug!(id, ?command, "driver command");

        let mut line = serde_json::to_string(&Envelope { id, command: &command })?;
        line.push('\n');
        channel.stdin.write_all(line.as_bytes()).await?;
        channel.stdin.flush().await?;

        let reply = read_reply(&mut channel.stdout).await?;
        if reply.id != id {
            return Err(E2eError::Playwright(format!(
                "reply out of order: expected {}, got {}",
                id, reply.id
            )));
        }
        if !reply.ok {
            return Err(E2eError::Playwright(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(reply.value)
    }

    /// Close the browser and wait for the driver process to exit
    pub async fn close(&self) -> E2eResult<()> {
        let acknowledged = self.send(DriverCommand::Close).await;
        let mut child = self.child.lock().await;
        if let Err(e) = acknowledged {
            warn!("Driver did not acknowledge close, killing it: {}", e);
            child.start_kill()?;
        }
        let status = child.wait().await?;
        debug!("Driver exited with {}", status);
        Ok(())
    }
}

async fn read_reply(stdout: &mut Lines<BufReader<ChildStdout>>) -> E2eResult<Reply> {
    loop {
        let line = stdout.next_line().await?.ok_or(E2eError::DriverClosed)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Reply>(line) {
            Ok(reply) => return Ok(reply),
            // Page scripts and Playwright itself may write to stdout
            Err(_) => debug!("driver output: {}", line),
        }
    }
}

#[async_trait]
impl Driver for PlaywrightHandle {
    async fn new_page(&self) -> E2eResult<()> {
        self.send(DriverCommand::NewPage).await.map(drop)
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.send(DriverCommand::Goto { url }).await.map(drop)
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.send(DriverCommand::Click { selector }).await.map(drop)
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.send(DriverCommand::Fill { selector, value }).await.map(drop)
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.send(DriverCommand::SelectOption { selector, value }).await.map(drop)
    }

    async fn inner_text(&self, selector: &str) -> E2eResult<String> {
        let value = self.send(DriverCommand::InnerText { selector }).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn all_inner_texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        let value = self.send(DriverCommand::AllInnerTexts { selector }).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn wait_for(&self, selector: &str, state: WaitState) -> E2eResult<bool> {
        let value = self.send(DriverCommand::WaitFor { selector, state }).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn reload(&self) -> E2eResult<()> {
        self.send(DriverCommand::Reload).await.map(drop)
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.send(DriverCommand::Screenshot { path }).await.map(drop)
    }
}

/// Build the Node.js script that hosts the browser and serves commands
pub fn build_driver_script(config: &PlaywrightConfig) -> String {
    format!(
        r#"
const {{ chromium, firefox, webkit, errors }} = require('playwright');
const readline = require('readline');

(async () => {{
  const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
  let browser;
  try {{
    browser = await {browser}.launch({{ headless: {headless} }});
  }} catch (error) {{
    reply({{ id: 0, ok: false, error: error.message }});
    process.exit(1);
  }}
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  context.setDefaultTimeout({timeout_ms});
  let page = await context.newPage();

  const handlers = {{
    new_page: async () => {{ await page.close(); page = await context.newPage(); }},
    goto: async (c) => {{ await page.goto(c.url, {{ waitUntil: 'networkidle' }}); }},
    click: async (c) => {{ await page.locator(c.selector).first().click(); }},
    fill: async (c) => {{ await page.locator(c.selector).first().fill(c.value); }},
    select_option: async (c) => {{ await page.locator(c.selector).first().selectOption(c.value); }},
    inner_text: async (c) => (await page.locator(c.selector).first().innerText()).trim(),
    all_inner_texts: async (c) => (await page.locator(c.selector).allInnerTexts()).map((t) => t.trim()),
    wait_for: async (c) => page.locator(c.selector).first()
      .waitFor({{ state: c.state }})
      .then(() => true, (error) => {{
        if (error instanceof errors.TimeoutError) return false;
        throw error;
      }}),
    reload: async () => {{ await page.reload({{ waitUntil: 'networkidle' }}); }},
    screenshot: async (c) => {{ await page.screenshot({{ path: c.path, fullPage: true }}); }},
  }};

  reply({{ id: 0, ok: true }});

  const rl = readline.createInterface({{ input: process.stdin }});
  for await (const line of rl) {{
    if (!line.trim()) continue;
    const c = JSON.parse(line);
    if (c.cmd === 'close') {{
      reply({{ id: c.id, ok: true }});
      break;
    }}
    const handler = handlers[c.cmd];
    if (!handler) {{
      reply({{ id: c.id, ok: false, error: 'unknown command: ' + c.cmd }});
      continue;
    }}
    try {{
      const value = await handler(c);
      reply({{ id: c.id, ok: true, value: value === undefined ? null : value }});
    }} catch (error) {{
      reply({{ id: c.id, ok: false, error: error.message }});
    }}
  }}
  rl.close();
  await browser.close();
  process.exit(0);
}})();
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
        timeout_ms = config.timeout.as_millis(),
    )
}
