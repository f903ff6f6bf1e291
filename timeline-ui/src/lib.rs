//! Giao diện timeline lịch sử cho môi trường WebAssembly.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::collections::HashSet;
    use std::rc::Rc;

    use crate::styles;
    use serde_wasm_bindgen::from_value;
    use timeline_core::grid::is_important;
    use timeline_core::{
        apply_cascade, events_for_region, filter_events, region_slug, region_title, EventDetail,
        EventTone, GridLayout, HoverState, MinimapLayout, MinimapSync, MinimapViewport,
        PlacedEvent, Region, Route, ScrollMetrics, ScrollObserver, TagSelection, TagTaxonomy,
        TimelineConfig, TimelineEvent, YearTick,
    };
    use timeline_data::{default_dataset, load_dataset_value, Dataset};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{
        console, Document, Element, HtmlInputElement, ResizeObserver, ScrollBehavior,
        ScrollToOptions, Window,
    };
    use yew::events::{Event, InputEvent, MouseEvent};
    use yew::prelude::*;
    use yew::TargetCast;

    /// Thông báo từ khung cuộn của lưới chính gửi xuống minimap.
    #[derive(Clone, Copy, PartialEq)]
    enum ScrollNotice {
        Scrolled(ScrollMetrics),
        Resized(ScrollMetrics),
    }

    fn read_metrics(element: &Element) -> ScrollMetrics {
        ScrollMetrics::new(
            f64::from(element.scroll_top()),
            f64::from(element.scroll_height()),
            f64::from(element.client_height()),
        )
    }

    fn current_route() -> Route {
        web_sys::window()
            .and_then(|window| window.location().hash().ok())
            .map(|hash| Route::parse(&hash))
            .unwrap_or(Route::Root)
    }

    #[derive(Properties, PartialEq)]
    pub struct TimelineAppProps {
        pub dataset: Rc<Dataset>,
        pub config: Rc<TimelineConfig>,
    }

    #[function_component(TimelineApp)]
    fn timeline_app(props: &TimelineAppProps) -> Html {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let route = use_state(current_route);
        {
            let route = route.clone();
            use_effect_with((), move |_| {
                let listener = Closure::<dyn FnMut()>::new(move || route.set(current_route()));
                let window = web_sys::window();
                if let Some(window) = &window {
                    if let Err(err) = window.add_event_listener_with_callback(
                        "hashchange",
                        listener.as_ref().unchecked_ref(),
                    ) {
                        console::error_1(&err);
                    }
                }
                move || {
                    if let Some(window) = window {
                        if let Err(err) = window.remove_event_listener_with_callback(
                            "hashchange",
                            listener.as_ref().unchecked_ref(),
                        ) {
                            console::error_1(&err);
                        }
                    }
                    drop(listener);
                }
            });
        }

        let selected = use_state(TagSelection::new);
        let notice = use_state(|| ScrollNotice::Resized(ScrollMetrics::default()));
        let container_ref = use_node_ref();

        {
            let notice = notice.clone();
            let container_ref = container_ref.clone();
            use_effect_with((*route).clone(), move |_| {
                let target = container_ref.cast::<Element>();
                let observed = target.clone();
                let callback = Closure::<dyn FnMut()>::new(move || {
                    if let Some(element) = &observed {
                        notice.set(ScrollNotice::Resized(read_metrics(element)));
                    }
                });
                let observer = match (&target, ResizeObserver::new(callback.as_ref().unchecked_ref())) {
                    (Some(element), Ok(observer)) => {
                        observer.observe(element);
                        Some(observer)
                    }
                    (None, _) => None,
                    (_, Err(err)) => {
                        console::error_1(&err);
                        None
                    }
                };
                move || {
                    if let Some(observer) = observer {
                        observer.disconnect();
                    }
                    drop(callback);
                }
            });
        }

        let dataset = &props.dataset;
        let config = &props.config;

        let body = match &*route {
            Route::Region(segment) => html! {
                <RegionPage
                    events={dataset.events.clone()}
                    segment={segment.clone()}
                    config={(**config).clone()}
                />
            },
            Route::Root => {
                let filtered: Vec<TimelineEvent> =
                    filter_events(&dataset.events, &selected, &dataset.taxonomy)
                        .into_iter()
                        .cloned()
                        .collect();

                let on_toggle = {
                    let selected = selected.clone();
                    let dataset = dataset.clone();
                    Callback::from(move |tag: String| {
                        selected.set(apply_cascade(&selected, &tag, &dataset.taxonomy));
                    })
                };

                let on_scroll = {
                    let notice = notice.clone();
                    let container_ref = container_ref.clone();
                    Callback::from(move |_: Event| {
                        if let Some(element) = container_ref.cast::<Element>() {
                            notice.set(ScrollNotice::Scrolled(read_metrics(&element)));
                        }
                    })
                };

                let scroll_to = |to_bottom: bool| {
                    let container_ref = container_ref.clone();
                    Callback::from(move |_: MouseEvent| {
                        if let Some(element) = container_ref.cast::<Element>() {
                            let top = if to_bottom { element.scroll_height() } else { 0 };
                            let options = ScrollToOptions::new();
                            options.set_top(f64::from(top));
                            options.set_behavior(ScrollBehavior::Smooth);
                            element.scroll_to_with_scroll_to_options(&options);
                        }
                    })
                };

                html! {
                    <div class="timeline-root">
                        <aside class="tag-column">
                            <TagFilterMenu
                                taxonomy={Rc::new(dataset.taxonomy.clone())}
                                selected={(*selected).clone()}
                                on_toggle={on_toggle}
                            />
                        </aside>
                        <div class="grid-scroll" ref={container_ref.clone()} onscroll={on_scroll}>
                            <TimelineGrid events={filtered.clone()} config={(**config).clone()} />
                        </div>
                        <div class="minimap-column">
                            <div class="minimap-controls">
                                <button type="button" title="Lên đầu" onclick={scroll_to(false)}>{"↑"}</button>
                                <button type="button" title="Xuống cuối" onclick={scroll_to(true)}>{"↓"}</button>
                            </div>
                            <TimelineMinimap
                                events={filtered}
                                config={(**config).clone()}
                                notice={*notice}
                            />
                        </div>
                    </div>
                }
            }
        };

        html! {
            <div class="app-shell">
                <Navbar route={(*route).clone()} />
                { body }
            </div>
        }
    }

    #[derive(Properties, PartialEq)]
    struct NavbarProps {
        route: Route,
    }

    #[function_component(Navbar)]
    fn navbar(props: &NavbarProps) -> Html {
        let root_active = props.route == Route::Root;
        html! {
            <nav class="timeline-nav">
                <a class="nav-brand" href={format!("#{}", Route::Root.href())}>{"chronovos"}</a>
                <div class="nav-links">
                    <a
                        class={classes!("nav-link", root_active.then_some("is-active"))}
                        href={format!("#{}", Route::Root.href())}
                    >
                        {"All Regions"}
                    </a>
                    {
                        for Region::ALL.into_iter().map(|region| {
                            let route = Route::for_region(region);
                            let is_active = props.route.region() == Some(region);
                            html! {
                                <a
                                    key={region_slug(region)}
                                    class={classes!("nav-link", is_active.then_some("is-active"))}
                                    data-region={region_slug(region)}
                                    href={format!("#{}", route.href())}
                                >
                                    { region.display_name() }
                                </a>
                            }
                        })
                    }
                </div>
            </nav>
        }
    }

    #[derive(Properties, PartialEq)]
    struct TagFilterMenuProps {
        taxonomy: Rc<TagTaxonomy>,
        selected: TagSelection,
        on_toggle: Callback<String>,
    }

    #[function_component(TagFilterMenu)]
    fn tag_filter_menu(props: &TagFilterMenuProps) -> Html {
        let query = use_state(String::new);

        let on_search = {
            let query = query.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                query.set(input.value());
            })
        };

        let visible = props.taxonomy.search(&query);

        html! {
            <div class="tag-menu">
                <header class="tag-menu-header">
                    <h2>{"Filter by Tags"}</h2>
                    <input
                        type="search"
                        placeholder="Search tags..."
                        value={(*query).clone()}
                        oninput={on_search}
                        aria-label="Tìm thẻ"
                    />
                </header>
                <div class="tag-tree">
                    {
                        for props.taxonomy.top_level_tags().into_iter().map(|tag| {
                            render_tag(&props.taxonomy, tag, 0, &props.selected, &visible, &props.on_toggle)
                        })
                    }
                </div>
            </div>
        }
    }

    fn render_tag(
        taxonomy: &TagTaxonomy,
        tag: &str,
        level: usize,
        selected: &TagSelection,
        visible: &HashSet<&str>,
        on_toggle: &Callback<String>,
    ) -> Html {
        if !visible.contains(tag) {
            return Html::default();
        }

        let is_active =
            selected.contains(tag) || taxonomy.is_group_fully_selected(tag, selected.as_slice());
        let onclick = {
            let on_toggle = on_toggle.clone();
            let tag = tag.to_string();
            Callback::from(move |_: MouseEvent| on_toggle.emit(tag.clone()))
        };

        html! {
            <div class="tag-node" key={tag.to_string()}>
                <button
                    type="button"
                    class={classes!("tag-button", is_active.then_some("is-active"))}
                    style={format!("margin-left: {}rem;", level as f64 * 0.5)}
                    onclick={onclick}
                >
                    { tag.to_string() }
                </button>
                {
                    for taxonomy.children_of(tag).into_iter().map(|child| {
                        render_tag(taxonomy, child, level + 1, selected, visible, on_toggle)
                    })
                }
            </div>
        }
    }

    #[derive(Properties, PartialEq)]
    struct TimelineGridProps {
        events: Vec<TimelineEvent>,
        config: TimelineConfig,
    }

    #[function_component(TimelineGrid)]
    fn timeline_grid(props: &TimelineGridProps) -> Html {
        let hover = use_state(HoverState::default);
        let refs: Vec<&TimelineEvent> = props.events.iter().collect();
        let grid = GridLayout::build(&refs, &props.config);
        let row_height = props.config.row_height;

        let on_leave = {
            let hover = hover.clone();
            Callback::from(move |_: MouseEvent| {
                let mut next = (*hover).clone();
                next.pointer_left();
                hover.set(next);
            })
        };

        let columns_class = classes!("grid-columns", (!grid.is_single_region()).then_some("is-multi"));

        html! {
            <div class="timeline-grid" onmouseleave={on_leave}>
                <div class="grid-header">
                    <div class="axis-heading">{"Year"}</div>
                    <div class={columns_class.clone()}>
                        { for grid.columns.iter().map(|region| html! {
                            <div class="column-heading" key={region_slug(*region)}>{ region.display_name() }</div>
                        }) }
                    </div>
                </div>
                <div class="grid-body" style={format!("height: {}px;", grid.content_height())}>
                    <div class="year-axis">
                        { for grid.ticks().into_iter().map(|tick| render_tick(tick, row_height)) }
                    </div>
                    <div class={classes!(columns_class, "grid-tracks")}>
                        {
                            for grid.columns.iter().map(|region| html! {
                                <div class="region-track" key={region_slug(*region)} data-region={region_slug(*region)}>
                                    { for grid.column_events(*region).map(|placed| render_event(&grid, placed, &hover)) }
                                </div>
                            })
                        }
                    </div>
                </div>
            </div>
        }
    }

    fn render_tick(tick: YearTick, row_height: f64) -> Html {
        html! {
            <div
                class={classes!("year-tick", tick.weight.as_str())}
                key={tick.year}
                style={format!("height: {row_height}px;")}
            >
                {
                    tick.label.map(|label| html! {
                        <>
                            <span class="year-number">{ label }</span>
                            <span class="year-era">{ tick.era }</span>
                        </>
                    }).unwrap_or_default()
                }
            </div>
        }
    }

    fn render_event(grid: &GridLayout<'_>, placed: &PlacedEvent<'_>, hover: &UseStateHandle<HoverState>) -> Html {
        let event = placed.event;
        let event_box = grid.event_box(placed);
        let tone = EventTone::classify(event.tags.as_slice());
        let important = is_important(event);

        let onmousemove = {
            let hover = hover.clone();
            let id = event.id.clone();
            Callback::from(move |pointer: MouseEvent| {
                let mut next = (*hover).clone();
                next.pointer_moved(&id, f64::from(pointer.client_x()), f64::from(pointer.client_y()));
                hover.set(next);
            })
        };
        let onmouseleave = {
            let hover = hover.clone();
            Callback::from(move |_: MouseEvent| {
                let mut next = (*hover).clone();
                next.pointer_left();
                hover.set(next);
            })
        };

        let detail = hover
            .tooltip_anchor(&event.id)
            .map(|(x, y)| render_detail(&EventDetail::of(event), x, y))
            .unwrap_or_default();

        html! {
            <div
                key={event.id.clone()}
                class={classes!("timeline-event", tone.as_str(), important.then_some("is-important"))}
                style={format!(
                    "top: {:.2}px; height: {:.2}px; left: {:.4}%; width: {:.4}%;",
                    event_box.top, event_box.height, event_box.left, event_box.width
                )}
                onmousemove={onmousemove}
                onmouseleave={onmouseleave}
            >
                <div class="event-label">{ event.name.clone() }</div>
                { detail }
            </div>
        }
    }

    fn render_detail(detail: &EventDetail, x: f64, y: f64) -> Html {
        html! {
            <div class="event-detail" style={format!("left: {x}px; top: {y}px;")}>
                <div class="event-detail-name">{ detail.name.clone() }</div>
                <div class="event-detail-years">{ detail.years.clone() }</div>
                <p class="event-detail-description">{ detail.description.clone() }</p>
                <div class="event-detail-tags">
                    { for detail.tags.iter().map(|tag| html! { <span class="event-tag">{ tag.clone() }</span> }) }
                </div>
            </div>
        }
    }

    #[derive(Properties, PartialEq)]
    struct TimelineMinimapProps {
        events: Vec<TimelineEvent>,
        config: TimelineConfig,
        notice: ScrollNotice,
    }

    #[function_component(TimelineMinimap)]
    fn timeline_minimap(props: &TimelineMinimapProps) -> Html {
        let minimap_ref = use_node_ref();
        let refs: Vec<&TimelineEvent> = props.events.iter().collect();
        let layout = MinimapLayout::build(&refs, &props.config);

        let content_height = layout.content_height;
        let sync = use_mut_ref(|| MinimapSync::new(content_height, 0.0));
        let viewport = use_state(MinimapViewport::default);

        {
            let sync = sync.clone();
            let viewport = viewport.clone();
            let minimap_ref = minimap_ref.clone();
            use_effect_with(props.notice, move |notice| {
                let mut state = sync.borrow_mut();
                let element = minimap_ref.cast::<Element>();
                if let Some(element) = &element {
                    state.set_client_height(f64::from(element.client_height()));
                }
                match notice {
                    ScrollNotice::Scrolled(metrics) => state.scrolled(metrics),
                    ScrollNotice::Resized(metrics) => state.resized(metrics),
                }
                if let Some(element) = &element {
                    element.set_scroll_top(state.scroll_top().round() as i32);
                }
                viewport.set(state.viewport());
                || ()
            });
        }

        let columns_class = classes!("minimap-columns", (layout.columns.len() > 1).then_some("is-multi"));

        html! {
            <div class="timeline-minimap" style={format!("width: {}px;", props.config.minimap_width)}>
                <div class="minimap-scroll" ref={minimap_ref}>
                    <div class={columns_class} style={format!("height: {content_height}px;")}>
                        {
                            for layout.columns.iter().map(|region| html! {
                                <div class="minimap-track" key={region_slug(*region)}>
                                    {
                                        for layout.column_bars(*region).map(|bar| html! {
                                            <div
                                                key={bar.id.to_string()}
                                                class={classes!("minimap-bar", bar.tone.as_str())}
                                                style={format!("top: {}px; height: {}px;", bar.top, bar.height)}
                                            />
                                        })
                                    }
                                </div>
                            })
                        }
                        <div
                            class="minimap-viewport"
                            style={format!("top: {}px; height: {}px;", viewport.top, viewport.height)}
                        />
                    </div>
                </div>
            </div>
        }
    }

    #[derive(Properties, PartialEq)]
    struct RegionPageProps {
        events: Vec<TimelineEvent>,
        segment: String,
        config: TimelineConfig,
    }

    #[function_component(RegionPage)]
    fn region_page(props: &RegionPageProps) -> Html {
        let title = region_title(&props.segment);
        let events: Vec<TimelineEvent> = events_for_region(&props.events, &props.segment)
            .into_iter()
            .cloned()
            .collect();

        html! {
            <section class="region-page">
                <h1>{ title }</h1>
                {
                    if events.is_empty() {
                        html! { <p class="region-empty">{"Không có sự kiện nào cho khu vực này."}</p> }
                    } else {
                        html! { <TimelineGrid events={events} config={props.config.clone()} /> }
                    }
                }
            </section>
        }
    }

    #[wasm_bindgen]
    pub fn mount_timeline_view(selector: &str, dataset: JsValue, config: JsValue) -> Result<(), JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let dataset = if dataset.is_null() || dataset.is_undefined() {
            default_dataset()
        } else {
            let value: serde_json::Value = from_value(dataset)?;
            load_dataset_value(&value)
        }
        .map_err(|err| JsValue::from_str(&format!("Timeline error: {err}")))?;

        let config: TimelineConfig = if config.is_null() || config.is_undefined() {
            TimelineConfig::default()
        } else {
            from_value(config)?
        };

        yew::Renderer::<TimelineApp>::with_root_and_props(
            target,
            TimelineAppProps {
                dataset: Rc::new(dataset),
                config: Rc::new(config),
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_timeline_view;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_timeline_view(
    _: &str,
    _: wasm_bindgen::JsValue,
    _: wasm_bindgen::JsValue,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "timeline-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
