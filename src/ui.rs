use crate::clipboard::CopyIndicator;
use crate::contact::{Banner, ContactForm, Field};
use crate::content::{Project, SiteContent, TimelineItem, content};
use crate::model::Page;
use crate::player::{PlayerController, VolumeLevel};
use crate::projects::ProjectBrowser;
use crate::theme::{Rgba, ThemeDescriptor};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::time::Duration;

const PLAYER_WIDTH: u16 = 50;
const COLLAPSED_HEIGHT: u16 = 3;
const EXPANDED_HEIGHT: u16 = 6;
const PLAYLIST_EXTRA_HEIGHT: u16 = 4;
const PROGRESS_BAR_WIDTH: usize = 26;
const VOLUME_BAR_WIDTH: usize = 10;

/// Everything a frame needs, borrowed from the app for the duration of a draw.
pub struct View<'a> {
    pub theme: &'a ThemeDescriptor,
    pub page: Page,
    pub scroll: u16,
    pub player: &'a PlayerController,
    pub form: &'a ContactForm,
    pub editing_form: bool,
    pub status: &'a str,
    pub projects: &'a ProjectBrowser,
    pub selected_link: usize,
    pub copied: &'a CopyIndicator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiLayout {
    pub tabs: Rect,
    pub body: Rect,
    pub status: Rect,
    pub player: Rect,
    pub progress: Rect,
    pub page_dots: Rect,
}

#[derive(Clone, Copy)]
struct Colors {
    bg: Color,
    paper: Color,
    text: Color,
    muted: Color,
    primary: Color,
    primary_dark: Color,
    secondary: Color,
    on_primary: Color,
    border: Color,
    error: Color,
    success: Color,
}

fn blend(color: Rgba, background: Rgba) -> Color {
    let (r, g, b) = color.over(background);
    Color::Rgb(r, g, b)
}

fn colors(theme: &ThemeDescriptor) -> Colors {
    let palette = &theme.palette;
    let bg = palette.background;
    Colors {
        bg: blend(bg, bg),
        paper: blend(palette.paper, bg),
        text: blend(palette.text_primary, bg),
        muted: blend(palette.text_secondary, bg),
        primary: blend(palette.primary.main, bg),
        primary_dark: blend(palette.primary.dark, bg),
        secondary: blend(palette.secondary.main, bg),
        on_primary: blend(palette.primary.contrast_text, bg),
        border: blend(theme.components.button.primary_hover, bg),
        error: Color::Rgb(211, 47, 47),
        success: Color::Rgb(46, 125, 50),
    }
}

pub fn layout(area: Rect, player: &PlayerController) -> UiLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    let panel = player.panel();
    let height = if !panel.is_open() {
        COLLAPSED_HEIGHT
    } else if panel.shows_playlist() {
        EXPANDED_HEIGHT + PLAYLIST_EXTRA_HEIGHT
    } else {
        EXPANDED_HEIGHT
    };
    let body = vertical[1];
    let width = if panel.is_open() { PLAYER_WIDTH } else { 24 };
    let player_rect = Rect {
        x: body.right().saturating_sub(width + 1),
        y: body.bottom().saturating_sub(height),
        width: width.min(body.width),
        height: height.min(body.height),
    };

    let progress = if panel.is_open() {
        Rect {
            x: player_rect.x.saturating_add(1),
            y: player_rect.y.saturating_add(2),
            width: (PROGRESS_BAR_WIDTH as u16 + 2).min(player_rect.width.saturating_sub(2)),
            height: 1,
        }
    } else {
        Rect::default()
    };

    let page_dots = if panel.is_open() && panel.shows_playlist() {
        Rect {
            x: player_rect.x.saturating_add(1),
            y: player_rect.bottom().saturating_sub(2),
            width: player_rect.width.saturating_sub(2),
            height: 1,
        }
    } else {
        Rect::default()
    };

    UiLayout {
        tabs: vertical[0],
        body,
        status: vertical[2],
        player: player_rect,
        progress,
        page_dots,
    }
}

pub fn draw(frame: &mut Frame, view: &View) -> UiLayout {
    let colors = colors(view.theme);
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        area,
    );

    let regions = layout(area, view.player);
    frame.render_widget(nav_tabs(view.page, &colors), regions.tabs);

    let lines = page_lines(content(), view, &colors);
    let body = Paragraph::new(lines)
        .block(panel_block(view.page.label(), colors.paper, colors.text, colors.border))
        .wrap(Wrap { trim: false })
        .scroll((view.scroll, 0));
    frame.render_widget(body, regions.body);

    frame.render_widget(status_line(view, &colors), regions.status);

    frame.render_widget(Clear, regions.player);
    if view.player.panel().is_open() {
        draw_player_panel(frame, view.player, regions.player, &colors);
    } else {
        draw_player_button(frame, view.player, regions.player, &colors);
    }

    regions
}

fn nav_tabs(selected: Page, colors: &Colors) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        " folio ",
        Style::default()
            .fg(colors.on_primary)
            .bg(colors.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for (idx, page) in Page::ALL.into_iter().enumerate() {
        spans.push(Span::styled("  ", Style::default().fg(colors.muted)));
        let mut style = Style::default().fg(colors.muted);
        if page == selected {
            style = Style::default()
                .fg(colors.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!("{} {}", idx + 1, page.label()), style));
    }

    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors.border))
            .style(Style::default().bg(colors.bg)),
    )
}

fn heading(text: &str, colors: &Colors) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(colors.primary)
            .add_modifier(Modifier::BOLD),
    ))
}

fn body_text(text: &str, colors: &Colors) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(colors.text)))
}

fn muted_text(text: &str, colors: &Colors) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(colors.muted)))
}

fn page_lines(site: &SiteContent, view: &View, colors: &Colors) -> Vec<Line<'static>> {
    match view.page {
        Page::Home => home_lines(site, colors),
        Page::About => about_lines(site, colors),
        Page::Projects => projects_lines(site, view.projects, colors),
        Page::Contacts => contacts_lines(site, view, colors),
        Page::BehindStory => story_lines(site, colors),
    }
}

fn home_lines(site: &SiteContent, colors: &Colors) -> Vec<Line<'static>> {
    let home = &site.home;
    let mut lines = vec![
        Line::from(Span::styled(
            home.name.clone(),
            Style::default()
                .fg(colors.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            home.tagline.clone(),
            Style::default().fg(colors.secondary),
        )),
        Line::from(""),
        body_text(&home.intro, colors),
        Line::from(""),
        heading("What I do", colors),
    ];
    for service in &home.services {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(colors.secondary)),
            Span::styled(
                service.title.clone(),
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(muted_text(&format!("    {}", service.description), colors));
    }
    lines.push(Line::from(""));
    lines.push(heading("Technologies", colors));
    lines.push(body_text(&home.technologies.join("  ·  "), colors));
    if !home.actions.is_empty() {
        lines.push(Line::from(""));
        let mut spans = Vec::new();
        for action in &home.actions {
            spans.push(Span::styled(
                format!(" {} ", action.key),
                Style::default()
                    .fg(colors.on_primary)
                    .bg(colors.primary)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}   ", action.label),
                Style::default().fg(colors.text),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn skill_meter(level: u8) -> String {
    let level = usize::from(level.min(5));
    format!("{}{}", "■".repeat(level), "□".repeat(5 - level))
}

fn timeline_lines(items: &[TimelineItem], colors: &Colors, lines: &mut Vec<Line<'static>>) {
    for item in items {
        lines.push(Line::from(vec![
            Span::styled(
                item.title.clone(),
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}  ", item.place),
                Style::default().fg(colors.secondary),
            ),
            Span::styled(item.period.clone(), Style::default().fg(colors.muted)),
        ]));
        lines.push(muted_text(&format!("  {}", item.description), colors));
    }
}

fn about_lines(site: &SiteContent, colors: &Colors) -> Vec<Line<'static>> {
    let about = &site.about;
    let mut lines = vec![heading("Skills", colors)];
    for skill in &about.skills {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", skill.name), Style::default().fg(colors.text)),
            Span::styled(skill_meter(skill.level), Style::default().fg(colors.primary)),
            Span::styled(
                format!("  {}", about.level_name(skill.level)),
                Style::default().fg(colors.muted),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(heading("Education", colors));
    timeline_lines(&about.education, colors, &mut lines);
    lines.push(Line::from(""));
    lines.push(heading("Experience", colors));
    timeline_lines(&about.experience, colors, &mut lines);
    lines
}

fn projects_lines(
    site: &SiteContent,
    browser: &ProjectBrowser,
    colors: &Colors,
) -> Vec<Line<'static>> {
    if let Some(project) = browser.detail().and_then(|index| site.projects.get(index)) {
        return project_detail_lines(project, colors);
    }

    let filter = &browser.filter;
    let cursor = if browser.searching { "_" } else { "" };
    let mut lines = vec![Line::from(vec![
        Span::styled("Search: ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("{}{cursor}", filter.search),
            Style::default().fg(colors.text),
        ),
        Span::styled("   Category: ", Style::default().fg(colors.muted)),
        Span::styled(
            filter.category.clone(),
            Style::default()
                .fg(colors.secondary)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    let mut tech_spans = vec![Span::styled("Tech: ", Style::default().fg(colors.muted))];
    for (index, tech) in site.project_technologies().into_iter().enumerate() {
        let mut style = if filter.has_tech(tech) {
            Style::default()
                .fg(colors.on_primary)
                .bg(colors.primary)
        } else {
            Style::default().fg(colors.text)
        };
        if index == browser.tech_cursor() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        tech_spans.push(Span::styled(format!(" {tech} "), style));
    }
    lines.push(Line::from(tech_spans));

    let visible = browser.visible(&site.projects);
    lines.push(muted_text(
        &format!("Showing {} of {} projects", visible.len(), site.projects.len()),
        colors,
    ));
    lines.push(Line::from(""));

    if visible.is_empty() {
        lines.push(heading("No projects match your filters", colors));
        lines.push(muted_text("Press r to reset all filters", colors));
    }
    for (row, &index) in visible.iter().enumerate() {
        let project = &site.projects[index];
        let selected = row == browser.selected();
        lines.push(Line::from(vec![
            Span::styled(
                if selected { "> " } else { "  " },
                Style::default().fg(colors.primary),
            ),
            Span::styled(
                project.title.clone(),
                Style::default()
                    .fg(colors.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", project.category),
                Style::default().fg(colors.secondary),
            ),
        ]));
        lines.push(muted_text(
            &format!("    {}", project.technologies.join(" · ")),
            colors,
        ));
    }

    let hint = if browser.searching {
        "type to search  Enter/Esc done"
    } else if filter.is_active() {
        "/ search  c category  h/l tech  space toggle  Enter details  r clear filters"
    } else {
        "/ search  c category  h/l tech  space toggle  Enter details"
    };
    lines.push(Line::from(""));
    lines.push(muted_text(hint, colors));
    lines
}

fn project_detail_lines(project: &Project, colors: &Colors) -> Vec<Line<'static>> {
    vec![
        heading(&project.title, colors),
        Line::from(Span::styled(
            project.category.clone(),
            Style::default().fg(colors.secondary),
        )),
        Line::from(""),
        body_text(&project.description, colors),
        Line::from(""),
        heading("Technologies", colors),
        body_text(&project.technologies.join("  ·  "), colors),
        Line::from(""),
        muted_text("Esc back to projects", colors),
    ]
}

fn contacts_lines(site: &SiteContent, view: &View, colors: &Colors) -> Vec<Line<'static>> {
    let (form, editing) = (view.form, view.editing_form);
    let contacts = &site.contacts;
    let mut lines = vec![body_text(&contacts.intro, colors), Line::from("")];
    for (index, link) in contacts.links.iter().enumerate() {
        let selected = !editing && index == view.selected_link;
        let mut spans = vec![
            Span::styled(
                if selected { "> " } else { "  " },
                Style::default().fg(colors.primary),
            ),
            Span::styled(
                format!("{:<10}", link.label),
                Style::default().fg(colors.secondary),
            ),
            Span::styled(link.text.clone(), Style::default().fg(colors.text)),
            Span::styled(format!("  {}", link.url), Style::default().fg(colors.muted)),
        ];
        if view.copied.is_copied(index) {
            spans.push(Span::styled(
                "  Copied!",
                Style::default()
                    .fg(colors.success)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(heading("Send a message", colors));
    for field in Field::ALL {
        let focused = editing && form.focus() == Some(field);
        let marker = if focused { "> " } else { "  " };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(colors.primary)),
            Span::styled(
                format!("{:<9}", field.label()),
                Style::default().fg(colors.muted),
            ),
            Span::styled(
                format!("{}{cursor}", form.value(field)),
                Style::default().fg(colors.text),
            ),
        ]));
        if let Some(err) = form.error(field) {
            lines.push(Line::from(Span::styled(
                format!("           {err}"),
                Style::default().fg(colors.error),
            )));
        }
    }

    let hint = if form.is_submitting() {
        "Sending..."
    } else if editing {
        "Tab next field  Shift+Tab previous  Enter send  Esc stop editing"
    } else {
        "↑/↓ select link  c copy  e edit the form  x dismiss notice"
    };
    lines.push(Line::from(""));
    lines.push(muted_text(hint, colors));

    match form.banner() {
        Some(Banner::Success { .. }) => lines.push(Line::from(Span::styled(
            crate::contact::SEND_SUCCEEDED_MESSAGE,
            Style::default()
                .fg(colors.success)
                .add_modifier(Modifier::BOLD),
        ))),
        Some(Banner::Failure(message)) => lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default()
                .fg(colors.error)
                .add_modifier(Modifier::BOLD),
        ))),
        None => {}
    }
    lines
}

fn story_lines(site: &SiteContent, colors: &Colors) -> Vec<Line<'static>> {
    let story = &site.story;
    let mut lines = vec![
        heading(&story.title, colors),
        muted_text(&story.tech_stack.join("  ·  "), colors),
    ];
    for chapter in &story.chapters {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            chapter.title.clone(),
            Style::default()
                .fg(colors.secondary)
                .add_modifier(Modifier::BOLD),
        )));
        for paragraph in &chapter.paragraphs {
            lines.push(body_text(paragraph, colors));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        story.closing.clone(),
        Style::default()
            .fg(colors.text)
            .add_modifier(Modifier::ITALIC),
    )));
    lines
}

fn draw_player_button(frame: &mut Frame, player: &PlayerController, area: Rect, colors: &Colors) {
    let icon = if player.is_playing() { "♪ playing" } else { "♪ music" };
    let button = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {icon} "),
            Style::default()
                .fg(colors.on_primary)
                .bg(colors.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" m", Style::default().fg(colors.muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.primary_dark))
            .style(Style::default().bg(colors.paper)),
    );
    frame.render_widget(button, area);
}

fn draw_player_panel(frame: &mut Frame, player: &PlayerController, area: Rect, colors: &Colors) {
    let (title, artist) = player
        .current_track()
        .map(|track| (track.name.as_str(), track.artist.as_str()))
        .unwrap_or(("-", "-"));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                title.to_string(),
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {artist}"), Style::default().fg(colors.muted)),
        ]),
        Line::from(vec![
            Span::styled(
                progress_bar(Some(player.progress()), PROGRESS_BAR_WIDTH),
                Style::default().fg(colors.primary),
            ),
            Span::styled(
                format!(
                    " {} / {}",
                    format_time(player.current_time()),
                    format_time(player.duration())
                ),
                Style::default().fg(colors.muted),
            ),
        ]),
        controls_line(player, colors),
        volume_line(player, colors),
    ];

    if player.panel().shows_playlist() {
        lines.push(Line::from(""));
        for (index, track) in player.page_tracks() {
            let current = index == player.current_index();
            let style = if current {
                Style::default()
                    .fg(colors.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            let slot = index % crate::player::TRACKS_PER_PAGE + 1;
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{slot} {} ", if current { "▶" } else { " " }),
                    Style::default().fg(colors.muted),
                ),
                Span::styled(format!("{} - {}", track.name, track.artist), style),
                Span::styled(
                    format!("  {}", track.display_duration),
                    Style::default().fg(colors.muted),
                ),
            ]));
        }
        lines.push(page_dots(player, colors));
    }

    let panel = Paragraph::new(lines).block(panel_block(
        "Now playing",
        colors.paper,
        colors.text,
        colors.primary_dark,
    ));
    frame.render_widget(panel, area);
}

fn controls_line(player: &PlayerController, colors: &Colors) -> Line<'static> {
    let toggle = |enabled: bool, label: &str| {
        let style = if enabled {
            Style::default()
                .fg(colors.secondary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted)
        };
        Span::styled(label.to_string(), style)
    };
    let play = if player.is_playing() { "❚❚" } else { "▶" };

    Line::from(vec![
        Span::styled("b ⏮  ", Style::default().fg(colors.text)),
        Span::styled(
            format!("␣ {play}  "),
            Style::default()
                .fg(colors.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("n ⏭   ", Style::default().fg(colors.text)),
        toggle(player.shuffle(), "s shuffle  "),
        toggle(player.repeat(), "r repeat  "),
        Span::styled("l list", Style::default().fg(colors.muted)),
    ])
}

fn volume_line(player: &PlayerController, colors: &Colors) -> Line<'static> {
    let icon = match player.volume_level() {
        VolumeLevel::Muted => "vol ×",
        VolumeLevel::Low => "vol ▂",
        VolumeLevel::High => "vol ▆",
    };
    Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(colors.text)),
        Span::styled(
            progress_bar(Some(f64::from(player.volume())), VOLUME_BAR_WIDTH),
            Style::default().fg(colors.secondary),
        ),
        Span::styled(
            format!(" {:>3}%  +/- 0 mute", (player.volume() * 100.0).round() as u16),
            Style::default().fg(colors.muted),
        ),
    ])
}

fn page_dots(player: &PlayerController, colors: &Colors) -> Line<'static> {
    let mut spans = vec![Span::styled("[ ", Style::default().fg(colors.muted))];
    for page in 0..player.page_count() {
        let (dot, color) = if page == player.playlist_page() {
            ("● ", colors.primary)
        } else {
            ("○ ", colors.muted)
        };
        spans.push(Span::styled(dot, Style::default().fg(color)));
    }
    spans.push(Span::styled("]", Style::default().fg(colors.muted)));
    Line::from(spans)
}

fn status_line(view: &View, colors: &Colors) -> Paragraph<'static> {
    let output = view
        .player
        .output_name()
        .unwrap_or_else(|| String::from("no output"));
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                " {} · {} ",
                view.theme.mode.as_str(),
                view.theme.accent_name
            ),
            Style::default().fg(colors.on_primary).bg(colors.primary_dark),
        ),
        Span::styled(
            "  t mode  a accent  m player  ←/→ pages  q quit  |  ",
            Style::default().fg(colors.muted),
        ),
        Span::styled(view.status.to_string(), Style::default().fg(colors.text)),
        Span::styled(format!("  |  {output}"), Style::default().fg(colors.muted)),
    ]))
    .style(Style::default().bg(colors.bg))
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

/// `m:ss`, the way track lengths are displayed.
pub fn format_time(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn progress_bar(ratio: Option<f64>, width: usize) -> String {
    let clamped = ratio.unwrap_or(0.0).clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}

/// Maps a click column inside the progress bar to a seek fraction.
pub fn progress_fraction(progress: Rect, column: u16) -> Option<f64> {
    let inner_start = progress.x.saturating_add(1);
    let inner_width = progress.width.saturating_sub(2);
    if inner_width == 0 || column < inner_start || column >= inner_start + inner_width {
        return None;
    }
    Some(f64::from(column - inner_start) / f64::from(inner_width.saturating_sub(1).max(1)))
}

/// Maps a click column on the page dots row to a playlist page.
pub fn page_dot_at(page_dots: Rect, column: u16, page_count: usize) -> Option<usize> {
    let first_dot = page_dots.x.saturating_add(2);
    if page_dots.width == 0 || column < first_dot {
        return None;
    }
    let offset = usize::from(column - first_dot);
    let page = offset / 2;
    (offset % 2 == 0 && page < page_count).then_some(page)
}
