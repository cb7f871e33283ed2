pub fn render_index(date: &str) -> String {
    INDEX_HTML.replace("{{DATE}}", date)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Viva Radiante</title>
  <style>
    :root {
      --bg-1: #fdf2f8;
      --bg-2: #ede9fe;
      --ink: #1f2937;
      --accent: #a855f7;
      --accent-2: #ec4899;
      --ok: #16a34a;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 20px 50px rgba(88, 28, 135, 0.14);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2) 60%, #ccfbf1);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 { margin: 0; font-size: 2rem; }
    h2 { margin: 0 0 12px; font-size: 1.3rem; }
    .subtitle { margin: 4px 0 0; color: #6b7280; }

    input, select {
      width: 100%;
      padding: 12px;
      border: 2px solid #e5e7eb;
      border-radius: 12px;
      font-size: 1rem;
      margin-bottom: 10px;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: linear-gradient(to right, var(--accent-2), var(--accent));
      color: white;
    }

    button.ghost { background: #f3f4f6; color: var(--ink); }

    .routine {
      display: flex;
      align-items: center;
      justify-content: space-between;
      padding: 12px 14px;
      border: 2px solid #e9d5ff;
      border-radius: 14px;
      margin-bottom: 8px;
      cursor: pointer;
    }

    .routine.done { border-color: #bbf7d0; background: #f0fdf4; }
    .routine .slot { color: #6b7280; font-size: 0.85rem; }

    .bar { width: 100%; background: #e5e7eb; border-radius: 999px; height: 10px; }
    .bar > div {
      height: 10px;
      border-radius: 999px;
      background: linear-gradient(to right, #4ade80, #10b981);
      transition: width 300ms ease;
    }

    .achievement { padding: 10px 12px; border: 2px solid #e5e7eb; border-radius: 12px; margin-bottom: 8px; }
    .achievement.done { border-color: #bbf7d0; background: #f0fdf4; }
    .achievement .meta { color: #6b7280; font-size: 0.85rem; }

    .points { font-size: 2.2rem; font-weight: 700; color: var(--accent); }
    .status { min-height: 1.2em; color: #6b7280; }
    .status[data-type="error"] { color: #dc2626; }
    .hidden { display: none; }
    .row { display: flex; gap: 10px; }
    .row > * { flex: 1; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Viva Radiante</h1>
      <p class="subtitle">Your daily self-care routine for {{DATE}}</p>
    </header>

    <section id="auth-panel">
      <h2>Sign in</h2>
      <input id="full-name" placeholder="Full name (sign up only)" />
      <input id="email" type="email" placeholder="you@example.com" />
      <input id="password" type="password" placeholder="Password" minlength="6" />
      <div class="row">
        <button id="signin-btn" type="button">Sign in</button>
        <button id="signup-btn" type="button" class="ghost">Create account</button>
      </div>
    </section>

    <section id="dashboard" class="hidden">
      <div class="row" style="align-items: center; justify-content: space-between;">
        <div>
          <h2>Today's routine</h2>
          <p class="subtitle" id="progress-label">0 of 0 tasks done</p>
        </div>
        <button id="signout-btn" type="button" class="ghost">Sign out</button>
      </div>
      <div id="routines"></div>
      <div class="bar"><div id="progress-bar" style="width: 0%"></div></div>

      <h2 style="margin-top: 20px;">Your points</h2>
      <div class="points" id="points">0</div>

      <h2 style="margin-top: 20px;">Achievements</h2>
      <div id="achievements"></div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const authPanel = document.getElementById('auth-panel');
    const dashboard = document.getElementById('dashboard');

    let token = localStorage.getItem('viva_token');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const api = async (path, options = {}) => {
      const headers = { 'content-type': 'application/json' };
      if (token) headers['authorization'] = `Bearer ${token}`;
      const res = await fetch(path, { ...options, headers });
      if (!res.ok) {
        throw new Error(await res.text() || 'Request failed');
      }
      if (res.status === 204) return null;
      return res.json();
    };

    const renderRoutines = (day) => {
      const container = document.getElementById('routines');
      container.innerHTML = '';
      for (const routine of day.routines) {
        const el = document.createElement('div');
        el.className = routine.completed ? 'routine done' : 'routine';
        el.innerHTML = `<span>${routine.task_name}</span><span class="slot">${routine.time_of_day}</span>`;
        el.addEventListener('click', () => toggle(routine));
        container.appendChild(el);
      }
      document.getElementById('progress-label').textContent =
        `${day.completed_count} of ${day.total_count} tasks done (${day.percentage}%)`;
      document.getElementById('progress-bar').style.width = `${day.percentage}%`;
    };

    const renderAchievements = (payload) => {
      const container = document.getElementById('achievements');
      container.innerHTML = '';
      for (const a of payload.achievements) {
        const el = document.createElement('div');
        el.className = a.completed ? 'achievement done' : 'achievement';
        el.innerHTML = `<div>${a.name}</div><div class="meta">${a.progress}/${a.target} &middot; ${a.points} pts</div>`;
        container.appendChild(el);
      }
      document.getElementById('points').textContent = payload.total_points;
    };

    const refresh = async () => {
      const [day, achievements] = await Promise.all([
        api('/api/routines'),
        api('/api/achievements'),
      ]);
      renderRoutines(day);
      renderAchievements(achievements);
      authPanel.classList.add('hidden');
      dashboard.classList.remove('hidden');
    };

    const toggle = async (routine) => {
      try {
        const result = await api('/api/routines/toggle', {
          method: 'POST',
          body: JSON.stringify({ routine_id: routine.id, completed: routine.completed }),
        });
        renderRoutines(result.day);
        const achievements = await api('/api/achievements');
        renderAchievements(achievements);
        if (result.newly_completed.length > 0) {
          setStatus(`Achievement unlocked: ${result.newly_completed[0].name}!`, 'ok');
        }
      } catch (err) {
        setStatus(err.message, 'error');
      }
    };

    const signIn = async (path, body) => {
      const result = await api(path, { method: 'POST', body: JSON.stringify(body) });
      token = result.token;
      localStorage.setItem('viva_token', token);
      await refresh();
      setStatus('', '');
    };

    document.getElementById('signin-btn').addEventListener('click', () => {
      signIn('/api/auth/signin', {
        email: document.getElementById('email').value,
        password: document.getElementById('password').value,
      }).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('signup-btn').addEventListener('click', () => {
      signIn('/api/auth/signup', {
        email: document.getElementById('email').value,
        password: document.getElementById('password').value,
        full_name: document.getElementById('full-name').value,
      }).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('signout-btn').addEventListener('click', async () => {
      try { await api('/api/auth/signout', { method: 'POST' }); } catch (err) {}
      token = null;
      localStorage.removeItem('viva_token');
      dashboard.classList.add('hidden');
      authPanel.classList.remove('hidden');
    });

    if (token) {
      refresh().catch(() => {
        token = null;
        localStorage.removeItem('viva_token');
      });
    }
  </script>
</body>
</html>
"#;
