use serde_json::Value;

use crate::analytics::Analytics;
use crate::markdown::MarkdownRenderer;
use crate::model::{Company, PolicyKind};
use crate::view::detail::render_detail;
use crate::view::grid::{render_grid, GridView};
use crate::store::CompanyStore;
use crate::view::dashboard;
use crate::view::html::escape_html;

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn render_modal(company: &Company, markdown: Option<&dyn MarkdownRenderer>) -> String {
    let detail = render_detail(company, markdown);
    let mut tabs = String::new();
    let mut panes = String::new();
    for tab in &detail.tabs {
        let kind = tab.kind;
        let active = if kind == PolicyKind::Terms { " active" } else { "" };
        tabs.push_str(&format!(
            r#"<button class="tab{active}" data-tab="{slug}">{label} <span class="tab-badge">{badge}</span></button>"#,
            slug = kind.slug(),
            label = kind.tab_label(),
            badge = tab.badge,
        ));
        let body = if tab.has_document {
            format!(
                r#"{summary}
        <div class="risks-list">{risks}</div>
        <button class="view-text" data-raw="{id}-{slug}">View Full Text</button>
        <div class="raw-panel hidden" id="raw-{id}-{slug}">{raw}</div>"#,
                summary = tab.summary_html,
                risks = tab.risks_html,
                raw = tab.raw_text_html,
                id = escape_html(&company.id),
                slug = kind.slug(),
            )
        } else {
            tab.empty_html.clone()
        };
        panes.push_str(&format!(
            r#"
      <section class="tab-pane{hidden}" data-pane="{slug}">
        {body}
      </section>"#,
            hidden = if kind == PolicyKind::Terms { "" } else { " hidden" },
            slug = kind.slug(),
        ));
    }
    format!(
        r#"
  <div class="modal hidden" id="modal-{id}">
    <div class="modal-content">
      <button class="close-modal" aria-label="Close">&times;</button>
      <header class="modal-header">{header}</header>
      <nav class="tabs">{tabs}</nav>{panes}
    </div>
  </div>"#,
        id = escape_html(&company.id),
        header = detail.header_html,
    )
}

pub fn render_html(
    companies: &[Company],
    analytics: &Analytics,
    charts: &[(&'static str, &Value)],
    markdown: Option<&dyn MarkdownRenderer>,
) -> Vec<u8> {
    let store = CompanyStore::from_companies(companies.to_vec());
    let grid = match render_grid(&store) {
        GridView::Cards(html) => html,
        GridView::Empty(html) | GridView::Failed(html) => html,
    };
    let modals: String = companies
        .iter()
        .map(|c| render_modal(c, markdown))
        .collect();
    let dashboard_body = if analytics.is_empty() {
        dashboard::render_empty()
    } else {
        dashboard::render_canvases()
    };
    let chart_map: serde_json::Map<String, Value> = charts
        .iter()
        .map(|(canvas, config)| (canvas.to_string(), (*config).clone()))
        .collect();
    let charts_json = json_for_script_tag(
        &serde_json::to_string(&chart_map).unwrap_or_else(|_| "{}".to_string()),
    );

    let page = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>TermsLens Report</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
  <style>
    body {{ font-family: Inter, sans-serif; background: #f8fafc; color: #0f172a; margin: 0; }}
    header.page {{ padding: 1rem 2rem; background: #fff; border-bottom: 1px solid #e2e8f0; }}
    main {{ max-width: 1440px; margin: 0 auto; padding: 2rem; }}
    .hidden {{ display: none !important; }}
    .stats, #companiesGrid {{ display: grid; gap: 1rem; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); }}
    .stat-card, .company-card, .chart-container {{ background: #fff; border-radius: .75rem; padding: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); }}
    .stat-value {{ display: block; font-size: 2rem; font-weight: 800; }}
    .company-card {{ cursor: pointer; }}
    .company-icon {{ width: 48px; height: 48px; border-radius: .5rem; background: #e2e8f0; display: flex; align-items: center; justify-content: center; font-weight: 700; overflow: hidden; }}
    .company-icon img {{ width: 100%; height: 100%; object-fit: contain; }}
    .risk-dot {{ display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 3px; }}
    .high {{ --sev: #f44336; }} .medium {{ --sev: #ff9800; }} .low {{ --sev: #4caf50; }} .unknown {{ --sev: #9e9e9e; }}
    .risk-dot, .severity-badge {{ background: var(--sev); }}
    .severity-badge {{ color: #fff; border-radius: 999px; padding: 0 .5rem; font-size: .75rem; text-transform: uppercase; }}
    .risk-item {{ border-left: 4px solid var(--sev); padding: .5rem 1rem; margin: .5rem 0; background: #fff; }}
    .modal {{ position: fixed; inset: 0; background: rgba(15,23,42,.6); display: flex; align-items: flex-start; justify-content: center; overflow-y: auto; }}
    .modal-content {{ background: #f8fafc; margin: 3rem auto; padding: 1.5rem; border-radius: 1rem; width: min(960px, 95vw); position: relative; }}
    .close-modal {{ position: absolute; right: 1rem; top: 1rem; font-size: 1.5rem; border: 0; background: none; cursor: pointer; }}
    .modal-header {{ display: flex; gap: 1rem; align-items: center; }}
    .tab.active {{ border-bottom: 2px solid #135bec; }}
    .raw-text {{ white-space: pre-wrap; max-height: 400px; overflow-y: auto; background: #fff; padding: 1rem; }}
    .charts {{ display: grid; gap: 1rem; grid-template-columns: repeat(auto-fill, minmax(420px, 1fr)); margin-top: 1rem; }}
  </style>
</head>
<body>
  <script type="application/json" id="charts-data">{charts_json}</script>
  <header class="page"><h1>TermsLens Report</h1></header>
  <main>
    <section id="analytics">
      <h2>Analytics</h2>
      <div class="stats">
{stats}
      </div>
      <div class="charts">
{dashboard_body}
      </div>
    </section>
    <section>
      <h2>Companies</h2>
      <div id="companiesGrid">
{grid}
      </div>
    </section>
  </main>
{modals}
  <script>
    (function () {{
      const configs = JSON.parse(document.getElementById('charts-data').textContent || '{{}}');
      if (window.Chart) {{
        Object.entries(configs).forEach(([canvasId, config]) => {{
          const canvas = document.getElementById(canvasId);
          if (canvas) new Chart(canvas, config);
        }});
      }}

      document.querySelectorAll('.company-card').forEach((card) => {{
        card.addEventListener('click', () => {{
          const modal = document.getElementById('modal-' + card.dataset.companyId);
          if (!modal) return;
          modal.querySelectorAll('.raw-panel').forEach((el) => el.classList.add('hidden'));
          modal.querySelectorAll('.view-text').forEach((btn) => (btn.textContent = 'View Full Text'));
          selectTab(modal, 'terms');
          modal.classList.remove('hidden');
        }});
      }});

      function selectTab(modal, slug) {{
        modal.querySelectorAll('.tab').forEach((t) => t.classList.toggle('active', t.dataset.tab === slug));
        modal.querySelectorAll('.tab-pane').forEach((p) => p.classList.toggle('hidden', p.dataset.pane !== slug));
      }}

      document.querySelectorAll('.modal').forEach((modal) => {{
        modal.querySelectorAll('.tab').forEach((tab) => {{
          tab.addEventListener('click', () => selectTab(modal, tab.dataset.tab));
        }});
        modal.querySelectorAll('.view-text').forEach((btn) => {{
          btn.addEventListener('click', () => {{
            const raw = document.getElementById('raw-' + btn.dataset.raw);
            const hidden = raw.classList.toggle('hidden');
            btn.textContent = hidden ? 'View Full Text' : 'Hide Full Text';
          }});
        }});
        modal.querySelector('.close-modal').addEventListener('click', () => modal.classList.add('hidden'));
        modal.addEventListener('click', (e) => {{
          if (e.target === modal) modal.classList.add('hidden');
        }});
      }});
    }})();
  </script>
</body>
</html>
"####,
        stats = dashboard::render_stats(analytics),
    );
    page.into_bytes()
}
