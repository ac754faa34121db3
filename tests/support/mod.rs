#![allow(dead_code)]

use async_trait::async_trait;
use gallery_bot::error::TransportError;
use gallery_bot::models::{ChatId, FileRef, InboundEvent, MessageHandle, RemoteFile};
use gallery_bot::services::git::{GitOutput, GitRunner};
use gallery_bot::transport::Transport;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch(String),
    Detached,
    /// `rev-parse` fails, e.g. in a fresh repository without commits.
    Unknown,
}

#[derive(Debug)]
pub struct GitState {
    pub head: Head,
    pub branches: BTreeSet<String>,
    pub remote: Option<String>,
    pub identity_fails: bool,
    pub pull_fails: bool,
    pub add_fails: bool,
    pub commit_fails: bool,
    pub nothing_staged: bool,
    /// Subcommands for which the git process cannot be started at all.
    pub unspawnable: Vec<&'static str>,
    /// Number of upcoming pushes (forced or not) that will be rejected.
    pub push_failures: usize,
    pub staged: Vec<String>,
    pub commits: Vec<String>,
    pub pushes: Vec<Vec<String>>,
    pub calls: Vec<Vec<String>>,
    /// Branch checked out when each `add` ran.
    pub branch_at_stage: Option<Head>,
}

impl Default for GitState {
    fn default() -> Self {
        Self {
            head: Head::Branch("main".into()),
            branches: ["main".to_string()].into_iter().collect(),
            remote: Some("https://example.com/repo.git".into()),
            identity_fails: false,
            pull_fails: false,
            add_fails: false,
            commit_fails: false,
            nothing_staged: false,
            unspawnable: Vec::new(),
            push_failures: 0,
            staged: Vec::new(),
            commits: Vec::new(),
            pushes: Vec::new(),
            calls: Vec::new(),
            branch_at_stage: None,
        }
    }
}

/// In-memory stand-in for a git working tree.
#[derive(Default)]
pub struct FakeGit {
    pub state: Mutex<GitState>,
}

impl FakeGit {
    pub fn new(state: GitState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&GitState) -> R) -> R {
        f(&self.state.lock().unwrap())
    }

    pub fn calls_starting_with(&self, prefix: &[&str]) -> Vec<Vec<String>> {
        self.with(|s| {
            s.calls
                .iter()
                .filter(|c| c.len() >= prefix.len() && c.iter().zip(prefix).all(|(a, b)| a == b))
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(&self, args: &[&str]) -> std::io::Result<GitOutput> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(args.iter().map(|a| a.to_string()).collect());
        // Suspend like a real subprocess would, so other tasks get to run.
        tokio::task::yield_now().await;

        let mut s = self.state.lock().unwrap();
        if args.first().is_some_and(|cmd| s.unspawnable.iter().any(|u| u == cmd)) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "git: command not found",
            ));
        }

        let out = match args {
            ["config", ..] => {
                if s.identity_fails {
                    GitOutput::failed("error: could not lock config file")
                } else {
                    GitOutput::ok("")
                }
            }
            ["remote", "get-url", _] => match &s.remote {
                Some(url) => GitOutput::ok(format!("{}\n", url)),
                None => GitOutput::failed("error: No such remote 'origin'"),
            },
            ["remote", "add", _, url] => {
                s.remote = Some(url.to_string());
                GitOutput::ok("")
            }
            ["rev-parse", "--abbrev-ref", "HEAD"] => match &s.head {
                Head::Branch(b) => GitOutput::ok(format!("{}\n", b)),
                Head::Detached => GitOutput::ok("HEAD\n"),
                Head::Unknown => GitOutput::failed("fatal: ambiguous argument 'HEAD'"),
            },
            ["checkout", "-b", branch] => {
                if s.branches.contains(*branch) {
                    GitOutput::failed("fatal: a branch with that name already exists")
                } else {
                    s.branches.insert(branch.to_string());
                    s.head = Head::Branch(branch.to_string());
                    GitOutput::ok("")
                }
            }
            ["checkout", branch] => {
                if s.branches.contains(*branch) {
                    s.head = Head::Branch(branch.to_string());
                    GitOutput::ok("")
                } else {
                    GitOutput::failed(format!("error: pathspec '{}' did not match", branch))
                }
            }
            ["pull", ..] => {
                if s.pull_fails {
                    GitOutput::failed("CONFLICT (content): Merge conflict")
                } else {
                    GitOutput::ok("Already up to date.")
                }
            }
            ["rebase", "--abort"] => GitOutput::ok(""),
            ["add", "--", paths @ ..] => {
                s.branch_at_stage = Some(s.head.clone());
                if s.add_fails {
                    GitOutput::failed("fatal: pathspec did not match any files")
                } else {
                    let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
                    s.staged.extend(paths);
                    GitOutput::ok("")
                }
            }
            ["diff", "--cached", "--quiet"] => {
                if s.nothing_staged || s.staged.is_empty() {
                    GitOutput::ok("")
                } else {
                    GitOutput::failed("")
                }
            }
            ["commit", "-m", message] => {
                if s.commit_fails {
                    GitOutput::failed("error: unable to write commit object")
                } else {
                    s.commits.push(message.to_string());
                    s.staged.clear();
                    GitOutput::ok("")
                }
            }
            ["push", ..] => {
                s.pushes.push(args.iter().map(|a| a.to_string()).collect());
                if s.push_failures > 0 {
                    s.push_failures -= 1;
                    GitOutput::failed("! [rejected] main -> main (fetch first)")
                } else {
                    GitOutput::ok("")
                }
            }
            _ => GitOutput::failed(format!("unexpected git call: {:?}", args)),
        };
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply { chat_id: ChatId, text: String },
    Edit { message_id: i64, text: String },
}

/// Records outgoing messages and serves scripted polling results.
pub struct FakeTransport {
    pub file: RemoteFile,
    pub polls: Mutex<VecDeque<Result<Vec<InboundEvent>, TransportError>>>,
    pub sent: Mutex<Vec<Sent>>,
    pub downloads: Mutex<Vec<String>>,
    pub fail_downloads: bool,
    pub fail_edits: bool,
}

impl FakeTransport {
    pub fn new(file: RemoteFile) -> Self {
        Self {
            file,
            polls: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
            fail_downloads: false,
            fail_edits: false,
        }
    }

    pub fn jpeg(path: Option<&str>) -> Self {
        Self::new(RemoteFile {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
            suggested_path: path.map(String::from),
        })
    }

    pub fn push_poll(&self, result: Result<Vec<InboundEvent>, TransportError>) {
        self.polls.lock().unwrap().push_back(result);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|s| match s {
                Sent::Reply { text, .. } | Sent::Edit { text, .. } => text,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn clear_webhook(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError> {
        self.polls.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(TransportError::Api {
                code: Some(502),
                description: "Bad Gateway".into(),
            })
        })
    }

    async fn download_file(&self, file: &FileRef) -> Result<RemoteFile, TransportError> {
        self.downloads.lock().unwrap().push(file.file_id.clone());
        if self.fail_downloads {
            return Err(TransportError::MissingFilePath(file.file_id.clone()));
        }
        Ok(self.file.clone())
    }

    async fn send_reply(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle, TransportError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent::Reply {
            chat_id,
            text: text.to_string(),
        });
        Ok(MessageHandle {
            chat_id,
            message_id: sent.len() as i64,
        })
    }

    async fn edit_reply(&self, handle: &MessageHandle, text: &str) -> Result<(), TransportError> {
        if self.fail_edits {
            return Err(TransportError::Api {
                code: Some(400),
                description: "Bad Request: message to edit not found".into(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Edit {
            message_id: handle.message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
