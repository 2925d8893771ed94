use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, Document, Element, Event, EventTarget, MouseEvent, SvgElement,
	SvgGraphicsElement, TouchEvent,
};

use super::animation::VibrationParams;
use super::geometry::{Point, ScreenMatrix};
use super::pointer::{END_EVENTS, PointerInput, PointerKind};
use super::render;
use super::state::{DiagramState, DragSession};
use super::types::SceneData;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type EndCallback = Rc<RefCell<Option<Closure<dyn FnMut(Event)>>>>;

/// Document-level move handlers, registered only while a drag is active.
struct MoveListeners {
	mouse: Closure<dyn FnMut(MouseEvent)>,
	touch: Closure<dyn FnMut(TouchEvent)>,
}

impl MoveListeners {
	fn callback(&self, kind: PointerKind) -> &js_sys::Function {
		match kind {
			PointerKind::Mouse => self.mouse.as_ref().unchecked_ref(),
			PointerKind::Touch => self.touch.as_ref().unchecked_ref(),
		}
	}

	fn attach(&self, document: &Document, kind: PointerKind) {
		let opts = AddEventListenerOptions::new();
		opts.set_passive(!kind.blocks_scrolling());
		if document
			.add_event_listener_with_callback_and_add_event_listener_options(
				kind.move_event(),
				self.callback(kind),
				&opts,
			)
			.is_err()
		{
			warn!("Could not listen for {}", kind.move_event());
		}
	}

	fn detach(&self, document: &Document, kind: PointerKind) {
		let _ = document.remove_event_listener_with_callback(kind.move_event(), self.callback(kind));
	}
}

fn page_document() -> Option<Document> {
	web_sys::window().and_then(|w| w.document())
}

fn screen_matrix(svg: &SvgElement) -> ScreenMatrix {
	let Some(m) = svg
		.dyn_ref::<SvgGraphicsElement>()
		.and_then(SvgGraphicsElement::get_screen_ctm)
	else {
		warn!("Screen matrix unavailable, using identity");
		return ScreenMatrix::IDENTITY;
	};
	ScreenMatrix::from([m.a(), m.b(), m.c(), m.d(), m.e(), m.f()])
}

fn client_to_local(svg_ref: NodeRef<leptos::svg::Svg>, client: Point) -> Point {
	match svg_ref.get_untracked() {
		Some(svg) => screen_matrix(&svg).screen_to_local(client),
		None => client,
	}
}

/// Id of the nearest `.draggable` ancestor of the event target.
fn draggable_target(target: Option<EventTarget>) -> Option<String> {
	let el: Element = target?.dyn_into().ok()?;
	let node = el.closest(".draggable").ok()??;
	Some(node.id())
}

fn is_dragging(state: RwSignal<DiagramState>) -> bool {
	state.with_untracked(|s| matches!(s.drag(), DragSession::Dragging { .. }))
}

fn move_drag(
	state: RwSignal<DiagramState>,
	svg_ref: NodeRef<leptos::svg::Svg>,
	pointer: PointerInput,
) {
	let local = client_to_local(svg_ref, pointer.client);
	state.update(|s| {
		s.drag_to(local);
	});
}

fn request_frame(frame: &FrameCallback) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(ref cb) = *frame.borrow() {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}

/// Runs the attention animation to completion, one update per animation frame.
fn run_attention(state: RwSignal<DiagramState>) {
	if !state
		.try_update(DiagramState::start_attention)
		.unwrap_or(false)
	{
		return;
	}
	let frame: FrameCallback = Rc::new(RefCell::new(None));
	let frame_inner = frame.clone();
	*frame.borrow_mut() = Some(Closure::new(move |ts: f64| {
		if state.try_update(|s| s.attention_frame(ts)).unwrap_or(false) {
			request_frame(&frame_inner);
		} else {
			frame_inner.borrow_mut().take();
		}
	}));
	request_frame(&frame);
}

/// Removes every document listener this canvas registered and resets the
/// controller, so no callback outlives the component.
fn detach_canvas(
	state: RwSignal<DiagramState>,
	listeners: &MoveListeners,
	end_cb: &EndCallback,
) {
	let ended = state.try_update(DiagramState::detach).flatten();
	let Some(doc) = page_document() else {
		return;
	};
	for kind in [PointerKind::Mouse, PointerKind::Touch] {
		listeners.detach(&doc, kind);
	}
	if let Some(cb) = end_cb.borrow_mut().take() {
		for event in END_EVENTS {
			let _ = doc.remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
		}
	}
	debug!("Diagram canvas detached (drag ended: {ended:?})");
}

#[component]
pub fn DiagramCanvas(
	data: SceneData,
	#[prop(default = VibrationParams::default())] vibration: VibrationParams,
	#[prop(default = 1000)] start_delay_ms: u64,
	#[prop(default = "0 0 640 260")] view_box: &'static str,
) -> impl IntoView {
	let state = match DiagramState::new(&data, vibration) {
		Ok(state) => RwSignal::new(state),
		Err(err) => {
			error!("Invalid diagram scene: {err}");
			return Err(err);
		}
	};
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();

	let listeners = Rc::new(MoveListeners {
		mouse: Closure::new(move |ev: MouseEvent| {
			move_drag(state, svg_ref, PointerInput::from_mouse(&ev));
		}),
		touch: Closure::new(move |ev: TouchEvent| {
			if !is_dragging(state) {
				return;
			}
			ev.prevent_default();
			if let Some(pointer) = PointerInput::from_touch(&ev) {
				move_drag(state, svg_ref, pointer);
			}
		}),
	});

	let end_cb: EndCallback = Rc::new(RefCell::new(None));
	let (end_cb_init, listeners_end) = (end_cb.clone(), listeners.clone());

	let teardown = StoredValue::new_local((listeners.clone(), end_cb));
	on_cleanup(move || {
		teardown.try_with_value(|(listeners, end_cb)| detach_canvas(state, listeners, end_cb));
	});

	Effect::new(move |_| {
		if svg_ref.get().is_none() || end_cb_init.borrow().is_some() {
			return;
		}
		let Some(doc) = page_document() else {
			warn!("No document, diagram stays static");
			return;
		};

		let (listeners, doc_end) = (listeners_end.clone(), doc.clone());
		*end_cb_init.borrow_mut() = Some(Closure::new(move |_: Event| {
			if !is_dragging(state) {
				return;
			}
			if let Some(kind) = state.try_update(DiagramState::end_drag).flatten() {
				listeners.detach(&doc_end, kind);
			}
		}));
		if let Some(ref cb) = *end_cb_init.borrow() {
			for event in END_EVENTS {
				let _ = doc.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
			}
		}

		set_timeout(
			move || run_attention(state),
			Duration::from_millis(start_delay_ms),
		);
	});

	let begin = move |target: Option<EventTarget>, pointer: PointerInput| {
		let Some(id) = draggable_target(target) else {
			return;
		};
		let local = client_to_local(svg_ref, pointer.client);
		let previous = state.with_untracked(|s| match s.drag() {
			DragSession::Dragging { kind, .. } => Some(kind),
			DragSession::Idle => None,
		});
		if !state
			.try_update(|s| s.begin_drag(&id, local, pointer.kind))
			.unwrap_or(false)
		{
			return;
		}
		if let Some(doc) = page_document() {
			if let Some(kind) = previous {
				listeners.detach(&doc, kind);
			}
			listeners.attach(&doc, pointer.kind);
		}
	};
	let begin_touch = begin.clone();

	let on_mousedown = move |ev: MouseEvent| {
		begin(ev.target(), PointerInput::from_mouse(&ev));
	};
	let on_touchstart = move |ev: TouchEvent| {
		if let Some(pointer) = PointerInput::from_touch(&ev) {
			begin_touch(ev.target(), pointer);
		}
	};

	let (node_count, line_count) = state.with_untracked(|s| (s.nodes().len(), s.lines().len()));

	Ok(view! {
		<svg
			node_ref=svg_ref
			id="svgCanvas"
			class="diagram-canvas"
			viewBox=view_box
			on:mousedown=on_mousedown
			on:touchstart=on_touchstart
		>
			{(0..line_count).map(|i| render::line_view(state, i)).collect_view()}
			{(0..node_count).map(|i| render::node_view(state, i)).collect_view()}
		</svg>
	})
}
