use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    param::Timeline, source::Source, AudioParam, Error, OscillatorType, Result, Shared,
    ToDuration, Waveform,
};

/// The frame counter that drives a context's time
#[derive(Debug, Clone)]
pub(crate) struct Clock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl Clock {
    pub fn new(sample_rate: f64) -> Self {
        Clock {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }
    pub fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate
    }
    fn tick(&self) {
        self.frames.fetch_add(1, Ordering::AcqRel);
    }
}

/// Identifies a node within its [`AudioContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct OscillatorState {
    waveform: OscillatorType,
    start: Option<f64>,
    stop: Option<f64>,
    phase: f64,
}

#[derive(Debug)]
enum NodeKind {
    Destination,
    Oscillator {
        state: Shared<OscillatorState>,
        frequency: Shared<Timeline>,
    },
    Gain {
        gain: Shared<Timeline>,
    },
}

impl NodeKind {
    fn name(&self) -> &'static str {
        match self {
            NodeKind::Destination => "destination",
            NodeKind::Oscillator { .. } => "oscillator",
            NodeKind::Gain { .. } => "gain",
        }
    }
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    inputs: Vec<NodeId>,
    finished: bool,
    output: Option<f64>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            inputs: Vec::new(),
            finished: false,
            output: None,
        }
    }
}

/// Live nodes keyed by id
///
/// Ids are never reused, so a handle to a pruned node can't reach a newer one.
#[derive(Debug)]
struct Graph {
    nodes: HashMap<NodeId, Node>,
    next_id: usize,
    pending_prune: bool,
}

const DESTINATION: NodeId = NodeId(0);

impl Graph {
    fn new() -> Self {
        Graph {
            nodes: HashMap::from([(DESTINATION, Node::new(NodeKind::Destination))]),
            next_id: 1,
            pending_prune: false,
        }
    }
    fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(kind));
        id
    }
    /// Whether `upstream` contributes to `node`'s output
    fn feeds(&self, upstream: NodeId, node: NodeId) -> bool {
        upstream == node
            || self.nodes[&node]
                .inputs
                .iter()
                .any(|&input| self.feeds(upstream, input))
    }
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        // Pruned nodes have finished for good, so connecting them changes nothing
        let (Some(from_node), Some(to_node)) = (self.nodes.get(&from), self.nodes.get(&to))
        else {
            return Ok(());
        };
        let invalid = Error::InvalidConnection {
            from: from_node.kind.name(),
            to: to_node.kind.name(),
        };
        match (&from_node.kind, &to_node.kind) {
            (NodeKind::Destination, _) | (_, NodeKind::Oscillator { .. }) => return Err(invalid),
            _ if self.feeds(to, from) => return Err(invalid),
            _ => {}
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            if !node.inputs.contains(&from) {
                node.inputs.push(from);
            }
        }
        Ok(())
    }
    fn render_frame(&mut self, time: f64, sample_rate: f64) -> f64 {
        for node in self.nodes.values_mut() {
            node.output = None;
        }
        let output = self.pull(DESTINATION, time, sample_rate);
        if self.pending_prune {
            self.prune();
        }
        output
    }
    /// Drop finished nodes and every connection to them
    fn prune(&mut self) {
        let finished: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.finished)
            .map(|(&id, _)| id)
            .collect();
        for id in &finished {
            self.nodes.remove(id);
        }
        for node in self.nodes.values_mut() {
            node.inputs.retain(|input| !finished.contains(input));
        }
        self.pending_prune = false;
    }
    fn pull(&mut self, id: NodeId, time: f64, sample_rate: f64) -> f64 {
        if let Some(output) = self.nodes[&id].output {
            return output;
        }
        let mut input = 0.0;
        let mut all_finished = !self.nodes[&id].inputs.is_empty();
        for i in 0..self.nodes[&id].inputs.len() {
            let upstream = self.nodes[&id].inputs[i];
            if self.nodes[&upstream].finished {
                continue;
            }
            input += self.pull(upstream, time, sample_rate);
            all_finished &= self.nodes[&upstream].finished;
        }
        let mut finished = false;
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0.0;
        };
        let output = match &node.kind {
            NodeKind::Destination => input,
            NodeKind::Gain { gain } => {
                finished = all_finished;
                input * gain.lock().value_at(time)
            }
            NodeKind::Oscillator { state, frequency } => {
                let mut state = state.lock();
                match (state.start, state.stop) {
                    (_, Some(stop)) if time >= stop => {
                        finished = true;
                        0.0
                    }
                    (Some(start), _) if time >= start => {
                        let amplitude = state.waveform.one_hz(state.phase);
                        let freq = frequency.lock().value_at(time);
                        state.phase = (state.phase + freq / sample_rate).rem_euclid(1.0);
                        amplitude
                    }
                    _ => 0.0,
                }
            }
        };
        node.finished = finished;
        node.output = Some(output);
        self.pending_prune |= finished;
        output
    }
}

/**
A graph of audio nodes with its own clock

Nodes are created from the context, connected to each other and eventually to the
[`destination`](AudioContext::destination), and scheduled against
[`current_time`](AudioContext::current_time).

Cloning a context yields another handle to the same graph.
*/
#[derive(Debug, Clone)]
pub struct AudioContext {
    graph: Shared<Graph>,
    clock: Clock,
}

impl AudioContext {
    /// Create a context that only advances when it is rendered
    pub fn offline(sample_rate: f64) -> Self {
        AudioContext {
            graph: Shared::new(Graph::new()),
            clock: Clock::new(sample_rate),
        }
    }
    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        self.clock.sample_rate
    }
    /// Get the time in seconds of the next frame to be rendered
    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }
    /// Get the node that all audible output must be connected to
    pub fn destination(&self) -> DestinationNode {
        DestinationNode {
            context: self.clone(),
        }
    }
    /// Create a new oscillator
    ///
    /// It is silent until it is started.
    pub fn create_oscillator(&self) -> OscillatorNode {
        let state = Shared::new(OscillatorState {
            waveform: OscillatorType::Sine,
            start: None,
            stop: None,
            phase: 0.0,
        });
        let frequency = Shared::new(Timeline::new(440.0));
        let id = self.graph.lock().add(NodeKind::Oscillator {
            state: state.clone(),
            frequency: frequency.clone(),
        });
        OscillatorNode {
            context: self.clone(),
            id,
            state,
            frequency: AudioParam::new(frequency, self.clock.clone()),
        }
    }
    /// Create a new gain node with a gain of 1
    pub fn create_gain(&self) -> GainNode {
        let gain = Shared::new(Timeline::new(1.0));
        let id = self.graph.lock().add(NodeKind::Gain { gain: gain.clone() });
        GainNode {
            context: self.clone(),
            id,
            gain: AudioParam::new(gain, self.clock.clone()),
        }
    }
    /// Get the number of live nodes in the graph, including the destination
    ///
    /// Nodes are dropped from the graph once they have finished playing.
    pub fn node_count(&self) -> usize {
        self.graph.lock().nodes.len()
    }
    /// Render frames into the buffer, advancing the clock by its length
    pub fn fill(&self, buffer: &mut [f64]) {
        let sample_rate = self.sample_rate();
        let mut graph = self.graph.lock();
        for sample in buffer {
            *sample = graph.render_frame(self.clock.now(), sample_rate);
            self.clock.tick();
        }
    }
    /// Render the given duration from the current time
    pub fn render(&self, duration: impl ToDuration) -> Vec<f64> {
        let frames = (duration.to_duration().as_secs_f64() * self.sample_rate()).round();
        let mut buffer = vec![0.0; frames as usize];
        self.fill(&mut buffer);
        buffer
    }
    /// Get a [`Source`] that renders this context frame by frame
    pub fn source(&self) -> ContextSource {
        ContextSource {
            context: self.clone(),
        }
    }
    fn connect(&self, from: NodeId, to: &impl AudioNode) -> Result<()> {
        if !self.graph.ptr_eq(&to.context().graph) {
            return Err(Error::InvalidConnection {
                from: "node",
                to: "node in another context",
            });
        }
        self.graph.lock().connect(from, to.id())
    }
}

/// A node in an [`AudioContext`]'s graph
pub trait AudioNode {
    /// Get the node's id
    fn id(&self) -> NodeId;
    /// Get the context the node belongs to
    fn context(&self) -> &AudioContext;
    /// Connect this node's output to another node's input
    fn connect(&self, destination: &impl AudioNode) -> Result<()>
    where
        Self: Sized,
    {
        self.context().connect(self.id(), destination)
    }
}

/// The final node of a context's graph
///
/// It sums all connected inputs.
#[derive(Debug, Clone)]
pub struct DestinationNode {
    context: AudioContext,
}

impl AudioNode for DestinationNode {
    fn id(&self) -> NodeId {
        DESTINATION
    }
    fn context(&self) -> &AudioContext {
        &self.context
    }
}

/// A node that generates a periodic waveform
#[derive(Debug, Clone)]
pub struct OscillatorNode {
    context: AudioContext,
    id: NodeId,
    state: Shared<OscillatorState>,
    frequency: AudioParam,
}

impl OscillatorNode {
    /// Get the waveform
    pub fn waveform(&self) -> OscillatorType {
        self.state.lock().waveform
    }
    /// Set the waveform
    pub fn set_waveform(&self, waveform: OscillatorType) {
        self.state.lock().waveform = waveform;
    }
    /// The frequency in Hz
    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }
    /// Start generating at the given time
    ///
    /// An oscillator can only be started once.
    pub fn start(&self, when: f64) -> Result<()> {
        if !when.is_finite() || when < 0.0 {
            return Err(Error::InvalidTime(when));
        }
        let mut state = self.state.lock();
        if state.start.is_some() {
            return Err(Error::AlreadyStarted);
        }
        state.start = Some(when);
        Ok(())
    }
    /// Stop generating at the given time
    ///
    /// A later call replaces the stop time.
    pub fn stop(&self, when: f64) -> Result<()> {
        if !when.is_finite() || when < 0.0 {
            return Err(Error::InvalidTime(when));
        }
        let mut state = self.state.lock();
        if state.start.is_none() {
            return Err(Error::NotStarted);
        }
        state.stop = Some(when);
        Ok(())
    }
    /// Get the scheduled start time
    pub fn start_time(&self) -> Option<f64> {
        self.state.lock().start
    }
    /// Get the scheduled stop time
    pub fn stop_time(&self) -> Option<f64> {
        self.state.lock().stop
    }
}

impl AudioNode for OscillatorNode {
    fn id(&self) -> NodeId {
        self.id
    }
    fn context(&self) -> &AudioContext {
        &self.context
    }
}

/// A node that scales its input
#[derive(Debug, Clone)]
pub struct GainNode {
    context: AudioContext,
    id: NodeId,
    gain: AudioParam,
}

impl GainNode {
    /// The amplitude multiplier
    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }
}

impl AudioNode for GainNode {
    fn id(&self) -> NodeId {
        self.id
    }
    fn context(&self) -> &AudioContext {
        &self.context
    }
}

/// Source returned from [`AudioContext::source`]
///
/// It never ends on its own. Bound it with [`Source::take`].
#[derive(Debug, Clone)]
pub struct ContextSource {
    context: AudioContext,
}

impl Source for ContextSource {
    fn sample_rate(&self) -> f64 {
        self.context.sample_rate()
    }
    fn next(&mut self) -> Option<f64> {
        let mut frame = [0.0];
        self.context.fill(&mut frame);
        Some(frame[0])
    }
}
