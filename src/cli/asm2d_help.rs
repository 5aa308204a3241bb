pub const ASM2D_ENG_HELPER: &'static str = "
                                General considerations \n
Concentrations are in g/m3 (COD, N or P as noted), alkalinity in mol HCO3-/m3, flows in m3/d, \n
volumes in m3, retention times in hours, temperature in degrees Celsius, time in days. \n
A task file is a JSON document. Use menu item 'Generate template' to get a complete, valid starter \n
file (asm2d_task_template.json) and edit it. Fields marked optional may be left out; parameter \n
blocks may list only the values that differ from the ASM2d defaults. \n

                                Top level fields \n
problem_name: \"...\" - optional, only printed. \n
temperature: %float% - operating temperature; rate constants are corrected by k(20)*theta^(T-20). \n
influent - either \n
    { \"Components\": { \"SNH\": 30.0, \"XS\": 200.0, ... } } - explicit concentrations, missing \n
    components are zero. Names: SI SF SA SO SNO SNH SND SPO4 SALK SN2 XI XS XH XAUT XPAO XPHA XPP XP XND \n
  or \n
    { \"Conventional\": { \"cod\", \"tkn\", \"nh4_n\", \"tp\", \"po4_p\", \"vfa\", \"alkalinity\", \"no3_n\" (optional) } } \n
    - measurements split into the components with fixed ratios (block 'fractionation'). \n
mode: \"SteadyState\" (default) or { \"Dynamic\": { \"t_end\": 2.0, \"step\": 0.001, \"integrator\": \"RK4\" | \"Euler\" } } \n
kinetics, arrhenius, stoichiometry, fractionation - optional parameter overrides. \n

                                network \n
zones: list of { \"zone_type\": \"anaerobic\" | \"anoxic\" | \"aerobic\", \"volume\": %float%, \n
    \"hrt_hours\": optional, replaces volume/flow, \"do_setpoint\": optional, aerobic zones, default 2.0 } \n
    Zones are passed in the given order. \n
influent_flow: %float% - Q, m3/d. \n
return_sludge: RAS/Q, returned from the last zone to the first one. Default 0. \n
internal_recycle: IR/Q, returned from the last aerobic zone to the first anoxic zone. Default 0. \n
max_outer_iterations: passes over the recycle network, default 100. \n
network_tolerance: optional; stop as soon as no zone state changes by more than this relative \n
    amount between two passes. Without it all passes are run. \n
solver: { time_step (d, default 0.01), max_iterations (10000), check_interval (100), \n
    tolerance (1e-6) } - linearly implicit Euler to steady state inside each zone. \n

                                Results \n
Steady state: one column per zone (anaerobic_1, anoxic_1, aerobic_1, ...) with all 19 components, \n
the number of passes, the network residual and whether every zone reached its tolerance. \n
A zone that hits max_iterations is reported, not treated as an error. \n
Dynamic: the state of every zone at t_end. \n

                                Model notes \n
Dissolved oxygen is not computed from an aeration rate: aerobic zones are pulled toward \n
do_setpoint with the hydraulic time constant, the other zones toward zero. \n
The anoxic processes of denitrifying PAO stop completely once SO reaches K_O2_PAO. \n
There is no clarifier: the return sludge has the concentrations of the last zone, so the \n
sludge age equals the hydraulic retention time of the train. Slow growers (XAUT, XPAO) wash out \n
unless the train is long and warm enough; the template plant at 15 C keeps no nitrifiers. \n
The aeration term also caps the oxygen supply at do_setpoint/HRT per day. \n
Denitrified nitrogen is tracked as SN2, so COD, N, P and charge balances close for every process. \n
";
