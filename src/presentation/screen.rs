//! Per-screen state container: a view model driven by a ractor actor.
//!
//! Intents are handled strictly one after another. State lives in a `watch`
//! channel so readers always see the latest value; effects are one-shot and
//! broadcast to whoever is subscribed at the time. Background collectors
//! started by the view model belong to the screen and are aborted when it
//! stops.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::CatalogError;

const EFFECT_CAPACITY: usize = 64;

#[async_trait]
pub trait ViewModel: Send + 'static {
    type Intent: Send + 'static;
    type State: Clone + Send + Sync + 'static;
    type Effect: Clone + Send + 'static;

    /// Name used in logs.
    const NAME: &'static str;

    fn initial_state(&self) -> Self::State;

    /// Runs once after the actor starts and before the first intent.
    async fn on_open(&mut self, _scope: &ScreenScope<Self>) {}

    async fn handle(&mut self, intent: Self::Intent, scope: &ScreenScope<Self>);
}

/// Shared writer for a screen's state; cloned into background collectors.
pub struct StateCell<S> {
    tx: Arc<watch::Sender<S>>,
}

impl<S> Clone for StateCell<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Clone> StateCell<S> {
    fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

/// Cloneable address for sending intents to a screen from elsewhere.
pub struct IntentSender<I> {
    actor: ActorRef<ScreenMessage<I>>,
}

impl<I> Clone for IntentSender<I> {
    fn clone(&self) -> Self {
        Self {
            actor: self.actor.clone(),
        }
    }
}

impl<I: Send + 'static> IntentSender<I> {
    /// False when the screen has already been closed.
    pub fn send(&self, intent: I) -> bool {
        self.actor.cast(ScreenMessage::Intent(intent)).is_ok()
    }
}

/// What a view model can touch while handling an intent.
pub struct ScreenScope<VM: ViewModel + ?Sized> {
    state: StateCell<VM::State>,
    effects: broadcast::Sender<VM::Effect>,
    myself: IntentSender<VM::Intent>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<VM: ViewModel> ScreenScope<VM> {
    pub fn state(&self) -> VM::State {
        self.state.get()
    }

    pub fn update(&self, f: impl FnOnce(&mut VM::State)) {
        self.state.update(f);
    }

    pub fn state_cell(&self) -> StateCell<VM::State> {
        self.state.clone()
    }

    pub fn emit(&self, effect: VM::Effect) {
        // No subscriber means nobody is listening for one-shot events right now.
        let _ = self.effects.send(effect);
    }

    /// Address of this screen, for re-dispatching intents from background tasks.
    pub fn sender(&self) -> IntentSender<VM::Intent> {
        self.myself.clone()
    }

    /// Run `fut` for as long as the screen is open.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        match self.tasks.lock() {
            Ok(mut tasks) => tasks.push(handle),
            Err(_) => handle.abort(),
        }
    }

    /// Apply every item of `stream` to the state until the screen closes.
    pub fn collect<T, S, F>(&self, stream: S, apply: F)
    where
        T: Send + 'static,
        S: Stream<Item = T> + Send + 'static,
        F: Fn(&mut VM::State, T) + Send + 'static,
    {
        let cell = self.state.clone();
        self.spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(item) = stream.next().await {
                cell.update(|s| apply(s, item));
            }
        });
    }

    fn abort_all(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

pub enum ScreenMessage<I> {
    Intent(I),
    /// Answered once every message queued before it has been handled.
    Sync(RpcReplyPort<()>),
}

struct ScreenActor<VM>(PhantomData<fn() -> VM>);

struct ScreenArgs<VM: ViewModel> {
    vm: VM,
    state: StateCell<VM::State>,
    effects: broadcast::Sender<VM::Effect>,
}

struct ScreenActorState<VM: ViewModel> {
    vm: VM,
    scope: ScreenScope<VM>,
}

#[ractor::async_trait]
impl<VM: ViewModel> Actor for ScreenActor<VM> {
    type Msg = ScreenMessage<VM::Intent>;
    type State = ScreenActorState<VM>;
    type Arguments = ScreenArgs<VM>;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let scope = ScreenScope {
            state: args.state,
            effects: args.effects,
            myself: IntentSender { actor: myself },
            tasks: Mutex::new(Vec::new()),
        };
        Ok(ScreenActorState { vm: args.vm, scope })
    }

    async fn post_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        debug!(screen = VM::NAME, "screen opened");
        state.vm.on_open(&state.scope).await;
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ScreenMessage::Intent(intent) => state.vm.handle(intent, &state.scope).await,
            ScreenMessage::Sync(reply) => {
                let _ = reply.send(());
            }
        }
        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.scope.abort_all();
        debug!(screen = VM::NAME, "screen closed");
        Ok(())
    }
}

/// Owner of an open screen. Dropping it closes the screen.
pub struct ScreenHandle<VM: ViewModel> {
    actor: ActorRef<ScreenMessage<VM::Intent>>,
    state: watch::Receiver<VM::State>,
    effects: broadcast::Sender<VM::Effect>,
    join: Option<JoinHandle<()>>,
}

impl<VM: ViewModel> ScreenHandle<VM> {
    pub async fn open(vm: VM) -> Result<Self, CatalogError> {
        let cell = StateCell::new(vm.initial_state());
        let state = cell.subscribe();
        let (effects, _rx) = broadcast::channel(EFFECT_CAPACITY);
        let args = ScreenArgs {
            vm,
            state: cell,
            effects: effects.clone(),
        };
        let (actor, join) = Actor::spawn(None, ScreenActor::<VM>(PhantomData), args)
            .await
            .map_err(|_| CatalogError::RactorError(format!("failed to open {}", VM::NAME)))?;
        Ok(Self {
            actor,
            state,
            effects,
            join: Some(join),
        })
    }

    pub fn dispatch(&self, intent: VM::Intent) {
        if self.actor.cast(ScreenMessage::Intent(intent)).is_err() {
            warn!(screen = VM::NAME, "intent dropped; screen is closed");
        }
    }

    /// Wait until every intent dispatched so far has been handled.
    pub async fn sync(&self) -> Result<(), CatalogError> {
        ractor::call!(self.actor, ScreenMessage::Sync)
            .map_err(|_| CatalogError::RactorError(format!("{} is not responding", VM::NAME)))
    }

    pub async fn dispatch_and_wait(&self, intent: VM::Intent) -> Result<VM::State, CatalogError> {
        self.dispatch(intent);
        self.sync().await?;
        Ok(self.state())
    }

    pub fn state(&self) -> VM::State {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<VM::State> {
        self.state.clone()
    }

    pub fn effects(&self) -> broadcast::Receiver<VM::Effect> {
        self.effects.subscribe()
    }

    pub fn sender(&self) -> IntentSender<VM::Intent> {
        IntentSender {
            actor: self.actor.clone(),
        }
    }

    /// Stop the actor and wait for it to finish.
    pub async fn close(mut self) {
        self.actor.stop(None);
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl<VM: ViewModel> Drop for ScreenHandle<VM> {
    fn drop(&mut self) {
        self.actor.stop(None);
    }
}
