use crate::config::{Config, DEFAULT_FOLDER_COLORS};

pub fn render_index(config: &Config) -> String {
    INDEX_HTML
        .replace("{{AUTOSAVE_MS}}", &config.autosave_delay.as_millis().to_string())
        .replace("{{DEMO}}", if config.demo { "demo" } else { "" })
}

/// Shifts each RGB channel of a `#RRGGBB` colour by `amount`, clamped.
pub fn adjust_color(color: &str, amount: i32) -> Option<String> {
    let hex = color.trim().strip_prefix('#').unwrap_or(color.trim());
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    let shift = |channel: u32| (channel as i32 + amount).clamp(0, 255) as u32;
    let r = shift((value >> 16) & 0xFF);
    let g = shift((value >> 8) & 0xFF);
    let b = shift(value & 0xFF);
    Some(format!("#{:06x}", (r << 16) | (g << 8) | b))
}

/// Cover gradient for a folder; invalid colours fall back to the palette.
pub fn folder_gradient(color: &str, index: usize) -> String {
    let (base, dark) = match adjust_color(color, -30) {
        Some(dark) => (color.trim().to_string(), dark),
        None => {
            let fallback = DEFAULT_FOLDER_COLORS[index % DEFAULT_FOLDER_COLORS.len()];
            let dark = adjust_color(fallback, -30).unwrap_or_else(|| fallback.to_string());
            (fallback.to_string(), dark)
        }
    };
    format!("linear-gradient(135deg, {base} 0%, {dark} 100%)")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Day Timer</title>
  <style>
    :root {
      --bg: #f4efe6;
      --ink: #2b2a28;
      --muted: #6b665f;
      --paper: #fffdf8;
      --alert: #C84630;
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.18);
      --folder: linear-gradient(135deg, #2E5C8A 0%, #103e6c 100%);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    .view { display: none; min-height: 100vh; }
    .view.active { display: grid; }

    #browse-view { place-items: center; gap: 24px; padding: 48px 18px; }

    .folder-carousel { position: relative; width: min(420px, 90vw); height: 300px; }

    .folder-cover {
      position: absolute;
      inset: 0;
      border-radius: 18px;
      box-shadow: var(--shadow);
      cursor: pointer;
      transition: transform 300ms ease, opacity 300ms ease;
    }

    .folder-cover.behind { transform: scale(0.95) translateY(20px); opacity: 0.5; pointer-events: none; }
    .folder-design { height: 100%; border-radius: 18px; padding: 32px; color: white; }
    .folder-title { margin: 0 0 8px; font-size: 1.8rem; }
    .folder-description { margin: 0; opacity: 0.85; }

    .carousel-controls { display: flex; gap: 16px; align-items: center; }
    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      cursor: pointer;
      background: var(--ink);
      color: white;
    }

    #working-view { padding: 28px; background: var(--folder); }
    .folder-sheet {
      background: var(--paper);
      border-radius: 18px;
      padding: 28px;
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 24px;
    }
    .folder-tab { grid-column: 1 / -1; display: flex; justify-content: space-between; align-items: center; }
    .folder-tab-title { margin: 0; }
    .content-section { display: grid; gap: 10px; align-content: start; }
    .task-list { list-style: none; padding: 0; margin: 0; display: grid; gap: 8px; }
    .task-item.completed .task-text { text-decoration: line-through; color: var(--muted); }
    .writing-textarea { width: 100%; min-height: 260px; font: inherit; padding: 12px; border-radius: 12px; }
    .meta { color: var(--muted); font-size: 0.85rem; display: flex; justify-content: space-between; }
    .incomplete-task-warning {
      background: var(--alert);
      color: white;
      border-radius: 10px;
      padding: 10px 14px;
      transition: opacity 600ms ease;
    }
    .toast {
      position: fixed;
      top: 20px;
      left: 50%;
      transform: translateX(-50%);
      background: var(--alert);
      color: white;
      padding: 1rem 2rem;
      border-radius: 8px;
      z-index: 1000;
    }
    .fade-out { opacity: 0; }
  </style>
</head>
<body data-mode="{{DEMO}}">
  <section id="browse-view" class="view active">
    <div class="folder-carousel"></div>
    <div class="carousel-controls">
      <button class="prev-btn" type="button">Prev</button>
      <span class="folder-counter">0 / 0</span>
      <button class="next-btn" type="button">Next</button>
    </div>
  </section>

  <section id="working-view" class="view">
    <div class="folder-sheet">
      <div class="folder-tab">
        <h2 class="folder-tab-title"></h2>
        <div>
          <button class="reset-day-btn" type="button">New day</button>
          <button class="close-btn" type="button">Close</button>
        </div>
      </div>

      <div class="content-section">
        <h3>Today</h3>
        <div class="daily-note-content"></div>
        <div class="incomplete-tasks-flash"></div>
        <ul class="task-list"></ul>
      </div>

      <div class="content-section">
        <h3>Writing</h3>
        <textarea class="writing-textarea" placeholder="Write here..."></textarea>
        <div class="meta"><span class="char-count">0 characters</span><span class="last-saved"></span></div>
        <div class="supportive-content"></div>
      </div>
    </div>
  </section>

  <script>
    const AUTOSAVE_MS = {{AUTOSAVE_MS}};
    const browseView = document.getElementById('browse-view');
    const workingView = document.getElementById('working-view');
    const carousel = document.querySelector('.folder-carousel');
    const counter = document.querySelector('.folder-counter');
    const textarea = document.querySelector('.writing-textarea');
    const charCount = document.querySelector('.char-count');
    const lastSaved = document.querySelector('.last-saved');
    const flash = document.querySelector('.incomplete-tasks-flash');
    let view = 'browse';
    let busy = false;

    const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));

    const api = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const showError = (message) => {
      const toast = document.createElement('div');
      toast.className = 'toast';
      toast.textContent = message;
      document.body.appendChild(toast);
      setTimeout(() => toast.remove(), 5000);
    };

    const play = async (transitions) => {
      const blocking = transitions.some((t) => t.blocking);
      busy = busy || blocking;
      for (const t of transitions) {
        if (t.kind === 'incomplete_flash') {
          sleep(500).then(() => flashIncomplete(t.durationMs));
          continue;
        }
        if (t.blocking) {
          await sleep(t.durationMs);
        }
      }
      if (blocking) {
        await api('POST', '/api/animation/complete');
        busy = false;
      }
    };

    const flashIncomplete = async (durationMs) => {
      const warning = flash.querySelector('.incomplete-task-warning');
      if (!warning) return;
      await sleep(durationMs);
      warning.classList.add('fade-out');
      await sleep(600);
      flash.innerHTML = '';
      await api('POST', '/api/incomplete/clear');
    };

    const setView = (next) => {
      view = next;
      browseView.classList.toggle('active', next === 'browse');
      workingView.classList.toggle('active', next === 'working');
    };

    const renderBrowse = (data) => {
      carousel.innerHTML = '';
      data.folders.forEach((folder, index) => {
        const cover = document.createElement('div');
        cover.className = 'folder-cover' + (index === data.currentIndex ? '' : ' behind');
        cover.style.zIndex = index === data.currentIndex ? '10' : '1';
        cover.dataset.folderId = folder.id;

        const design = document.createElement('div');
        design.className = 'folder-design';
        design.style.background = folder.gradient;

        const title = document.createElement('h2');
        title.className = 'folder-title';
        title.textContent = folder.title;

        const description = document.createElement('p');
        description.className = 'folder-description';
        description.textContent = folder.description;

        design.append(title, description);
        cover.appendChild(design);
        carousel.appendChild(cover);
      });
      counter.textContent = data.counter;
      setView('browse');
    };

    const renderTask = (task) => {
      const li = document.createElement('li');
      li.className = 'task-item' + (task.completed ? ' completed' : '');
      li.dataset.taskId = task.id;

      const checkbox = document.createElement('input');
      checkbox.type = 'checkbox';
      checkbox.id = `task-${task.id}`;
      checkbox.checked = task.completed;
      checkbox.addEventListener('change', () => toggleTask(task.id, li));

      const label = document.createElement('label');
      label.htmlFor = checkbox.id;
      label.className = 'task-text';
      label.textContent = task.text;

      li.append(checkbox, label);
      return li;
    };

    const renderWorking = (data) => {
      document.documentElement.style.setProperty('--folder', data.gradient);
      document.querySelector('.folder-tab-title').textContent = `${data.folder.title} - ${data.date}`;
      document.querySelector('.daily-note-content').innerHTML = data.dailyNoteHtml;
      document.querySelector('.supportive-content').innerHTML = data.supportiveHtml;

      flash.innerHTML = '';
      if (data.incompleteTasks.length > 0) {
        const warning = document.createElement('div');
        warning.className = 'incomplete-task-warning';
        warning.textContent = `${data.incompleteTasks.length} task(s) from yesterday still incomplete`;
        flash.appendChild(warning);
      }

      const list = document.querySelector('.task-list');
      list.innerHTML = '';
      data.tasks.forEach((task) => list.appendChild(renderTask(task)));

      textarea.value = data.note;
      charCount.textContent = `${data.note.length} characters`;
      setView('working');
    };

    const refreshBrowse = async () => renderBrowse(await api('GET', '/api/folders'));

    const navigate = async (direction) => {
      if (busy) return;
      const data = await api('POST', '/api/folders/navigate', { direction });
      renderBrowse(data);
      await play(data.transitions);
    };

    const openFolder = async (folderId) => {
      if (busy) return;
      const data = await api('POST', `/api/folders/${encodeURIComponent(folderId)}/open`);
      renderWorking(data);
      await play(data.transitions);
    };

    let saveTimer = null;
    const sendNote = () => api('PUT', '/api/note', { text: textarea.value })
      .then(() => { lastSaved.textContent = `Saved at ${new Date().toLocaleTimeString()}`; });

    // Pending keystrokes must reach the server before it flushes and leaves the folder.
    const flushNote = async () => {
      if (saveTimer === null) return;
      clearTimeout(saveTimer);
      saveTimer = null;
      await sendNote();
    };

    const closeFolder = async () => {
      if (busy) return;
      await flushNote();
      const data = await api('POST', '/api/folder/close');
      renderBrowse(data);
      await play(data.transitions);
    };

    const resetDay = async () => {
      if (busy) return;
      await flushNote();
      const data = await api('POST', '/api/day/reset');
      renderWorking(data);
      await play(data.transitions);
    };

    const toggleTask = async (taskId, li) => {
      const data = await api('POST', `/api/tasks/${encodeURIComponent(taskId)}/toggle`);
      if (!data.task) return;
      li.classList.toggle('completed', data.task.completed);
      await play(data.transitions);
    };

    textarea.addEventListener('input', () => {
      charCount.textContent = `${textarea.value.length} characters`;
      clearTimeout(saveTimer);
      saveTimer = setTimeout(() => {
        saveTimer = null;
        sendNote().catch((err) => showError(err.message));
      }, Math.min(AUTOSAVE_MS, 300));
    });

    const guard = (fn) => (...args) => fn(...args).catch((err) => showError(err.message));

    document.querySelector('.prev-btn').addEventListener('click', guard(() => navigate('prev')));
    document.querySelector('.next-btn').addEventListener('click', guard(() => navigate('next')));
    document.querySelector('.close-btn').addEventListener('click', guard(closeFolder));
    document.querySelector('.reset-day-btn').addEventListener('click', guard(resetDay));
    carousel.addEventListener('click', (event) => {
      const cover = event.target.closest('.folder-cover');
      if (cover) guard(openFolder)(cover.dataset.folderId);
    });

    document.addEventListener('keydown', (event) => {
      const tag = event.target.tagName;
      if (tag === 'TEXTAREA' || tag === 'INPUT') return;
      if (event.key === 'Escape' && view === 'working') guard(closeFolder)();
      if (view === 'browse' && event.key === 'ArrowLeft') { event.preventDefault(); guard(navigate)('prev'); }
      if (view === 'browse' && event.key === 'ArrowRight') { event.preventDefault(); guard(navigate)('next'); }
      if ((event.ctrlKey || event.metaKey) && event.key === 'n' && view === 'working') {
        event.preventDefault();
        guard(resetDay)();
      }
    });

    api('POST', '/api/animation/complete')
      .then(() => api('GET', '/api/working').then(renderWorking).catch(refreshBrowse))
      .catch(() => showError('Failed to initialize application. Please refresh the page.'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_color_darkens_and_clamps() {
        assert_eq!(adjust_color("#2E5C8A", -30).as_deref(), Some("#103e6c"));
        assert_eq!(adjust_color("#0A0A0A", -30).as_deref(), Some("#000000"));
        assert_eq!(adjust_color("#F0F0F0", 30).as_deref(), Some("#ffffff"));
        assert!(adjust_color("blue", -30).is_none());
    }

    #[test]
    fn invalid_colour_uses_palette_gradient() {
        assert_eq!(
            folder_gradient("not-a-colour", 6),
            "linear-gradient(135deg, #C84630 0%, #aa2812 100%)"
        );
    }

    #[test]
    fn index_page_embeds_autosave_delay() {
        let html = render_index(&Config::default());
        assert!(html.contains("const AUTOSAVE_MS = 2000;"));
        assert!(html.contains(r#"data-mode="demo""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn pending_note_is_sent_before_close_and_reset() {
        let html = render_index(&Config::default());
        for request in ["'/api/folder/close'", "'/api/day/reset'"] {
            let at = html.find(request).unwrap();
            let body = &html[html[..at].rfind("async () => {").unwrap()..at];
            assert!(body.contains("await flushNote();"), "{request}");
        }
        assert!(html.contains("clearTimeout(saveTimer);\n      saveTimer = null;"));
    }
}
