//! Shared test helpers: a scripted streaming provider.

use codewright_core::error::ProviderError;
use codewright_core::message::Message;
use codewright_core::provider::{
    ChunkReceiver, ModelSettings, Provider, ProviderRequest, ProviderResponse, StreamChunk,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// One scripted model turn.
#[derive(Debug, Clone)]
pub enum Turn {
    /// Stream these deltas, then finish normally.
    Chunks(Vec<String>),
    /// Stream these deltas, then fail mid-stream.
    FailAfter(Vec<String>, String),
    /// Stream these deltas, then keep the stream open until the consumer leaves.
    Hang(Vec<String>),
    /// Refuse to open the stream at all.
    Refuse(String),
}

impl Turn {
    pub fn text(text: &str) -> Self {
        Self::Chunks(vec![text.to_string()])
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Self::Chunks(chunks.iter().map(|c| c.to_string()).collect())
    }
}

/// A mock provider that replays scripted turns and records every prompt.
///
/// When the script runs out, the last turn repeats if `repeat_last` was
/// requested; otherwise the provider refuses.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Turn>>,
    repeat: Option<Turn>,
    prompts: Mutex<Vec<String>>,
    closed_streams: std::sync::Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            repeat: None,
            prompts: Mutex::new(Vec::new()),
            closed_streams: std::sync::Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with the same turn.
    pub fn repeating(turn: Turn) -> Self {
        Self {
            repeat: Some(turn),
            ..Self::new(vec![])
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Hanging streams whose consumer went away.
    pub fn closed_streams(&self) -> usize {
        self.closed_streams.load(Ordering::SeqCst)
    }

    fn next_turn(&self, request: &ProviderRequest) -> Option<Turn> {
        self.prompts.lock().unwrap().push(request.prompt_text());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let text = match self.next_turn(&request) {
            Some(Turn::Chunks(chunks)) | Some(Turn::Hang(chunks)) => chunks.concat(),
            Some(Turn::FailAfter(_, error)) | Some(Turn::Refuse(error)) => {
                return Err(ProviderError::Network(error));
            }
            None => return Err(ProviderError::NotConfigured("script exhausted".into())),
        };
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: request.model,
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let turn = match self.next_turn(&request) {
            Some(Turn::Refuse(error)) => return Err(ProviderError::Network(error)),
            Some(turn) => turn,
            None => return Err(ProviderError::NotConfigured("script exhausted".into())),
        };

        let (tx, rx) = mpsc::channel(16);
        let closed = self.closed_streams.clone();
        tokio::spawn(async move {
            let (chunks, ending) = match turn {
                Turn::Chunks(c) => (c, None),
                Turn::FailAfter(c, e) => (c, Some(Err(e))),
                Turn::Hang(c) => (c, Some(Ok(()))),
                Turn::Refuse(_) => return,
            };
            for chunk in chunks {
                if tx.send(Ok(StreamChunk::text(chunk))).await.is_err() {
                    return;
                }
            }
            match ending {
                None => {
                    let _ = tx
                        .send(Ok(StreamChunk {
                            done: true,
                            ..StreamChunk::default()
                        }))
                        .await;
                }
                Some(Err(e)) => {
                    let _ = tx.send(Err(ProviderError::StreamInterrupted(e))).await;
                }
                Some(Ok(())) => {
                    tx.closed().await;
                    closed.fetch_add(1, Ordering::SeqCst);
                }
            }
        });
        Ok(rx)
    }
}

pub fn settings() -> ModelSettings {
    ModelSettings::new("mock-model")
}
